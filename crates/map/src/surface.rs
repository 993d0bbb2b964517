use layers::{LayerId, MarkerLayer};

use crate::view::MapView;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("snapshot encoding failed: {0}")]
    Encode(String),
    #[error("snapshot write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("map bridge error: {0}")]
    Bridge(String),
}

/// The map rendering library as seen by the search flow.
///
/// Implemented by the OpenLayers bridge in the browser and by [`crate::MapModel`]
/// everywhere else.
pub trait MapSurface {
    fn view(&self) -> MapView;

    fn set_view(&mut self, view: MapView);

    fn add_layer(&mut self, layer: MarkerLayer);

    /// Returns `false` if no layer with `id` was present.
    fn remove_layer(&mut self, id: LayerId) -> bool;

    fn layer_count(&self) -> usize;

    fn globe_enabled(&self) -> bool;

    fn set_globe_enabled(&mut self, enabled: bool);

    /// Renders the current view synchronously and delivers it as a PNG named
    /// `file_name`.
    fn export_snapshot(&mut self, file_name: &str) -> Result<(), MapError>;
}
