use std::fs;
use std::path::PathBuf;

use layers::{Layer, LayerId, MarkerLayer};

use crate::globe::GlobeView;
use crate::snapshot::{Snapshot, encode_png, rasterize};
use crate::surface::{MapError, MapSurface};
use crate::view::{MapView, Viewport};

/// In-memory map: view, layer stack and globe state without a renderer.
///
/// Used by the CLI and by tests. Snapshots are rasterized locally and either
/// kept in memory or written into `export_dir`.
#[derive(Debug, Clone)]
pub struct MapModel {
    view: MapView,
    viewport: Viewport,
    layers: Vec<MarkerLayer>,
    globe: GlobeView,
    export_dir: Option<PathBuf>,
    last_snapshot: Option<Snapshot>,
}

impl MapModel {
    pub fn new(view: MapView, viewport: Viewport) -> Self {
        Self {
            view,
            viewport,
            layers: Vec::new(),
            globe: GlobeView::new(),
            export_dir: None,
            last_snapshot: None,
        }
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn layers(&self) -> &[MarkerLayer] {
        &self.layers
    }

    pub fn globe(&self) -> &GlobeView {
        &self.globe
    }

    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }
}

impl MapSurface for MapModel {
    fn view(&self) -> MapView {
        self.view
    }

    fn set_view(&mut self, view: MapView) {
        self.view = view;
        self.globe.sync_from(&self.view, self.viewport);
    }

    fn add_layer(&mut self, layer: MarkerLayer) {
        let id = layer.id();
        self.layers.retain(|l| l.id() != id);
        self.layers.push(layer);
    }

    fn remove_layer(&mut self, id: LayerId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.id() != id);
        self.layers.len() != before
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn globe_enabled(&self) -> bool {
        self.globe.enabled()
    }

    fn set_globe_enabled(&mut self, enabled: bool) {
        self.globe.set_enabled(enabled);
        self.globe.sync_from(&self.view, self.viewport);
    }

    fn export_snapshot(&mut self, file_name: &str) -> Result<(), MapError> {
        let img = rasterize(&self.view, self.viewport, &self.layers);
        let snapshot = encode_png(&img, file_name)?;
        if let Some(dir) = &self.export_dir {
            fs::create_dir_all(dir)?;
            fs::write(dir.join(file_name), &snapshot.png)?;
        }
        self.last_snapshot = Some(snapshot);
        Ok(())
    }
}
