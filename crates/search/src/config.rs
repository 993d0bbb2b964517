use std::fs;
use std::path::Path;

use map::{MapView, Viewport};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Viewer configuration. Every field has a default, so a config file only
/// needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URI of the search backend, e.g. `http://localhost:8080/api`.
    pub base_uri: String,
    pub page_size: u32,
    pub debounce_ms: u64,
    /// Zoom applied when centering on a selected place.
    pub focus_zoom: f64,
    /// `[lon, lat]` of the initial view.
    pub initial_center: [f64; 2],
    pub initial_zoom: f64,
    pub marker_icon: String,
    /// XYZ template for the base layer; the browser bridge falls back to OSM.
    pub tile_url: Option<String>,
    /// `[width, height]` of the headless map used for exports.
    pub viewport: [u32; 2],
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_uri: "http://localhost:8080".to_string(),
            page_size: 10,
            debounce_ms: 250,
            focus_zoom: 18.0,
            initial_center: [120.1286, 23.6022],
            initial_zoom: 7.0,
            marker_icon: layers::IconStyle::DEFAULT_SRC.to_string(),
            tile_url: None,
            viewport: [1280, 720],
        }
    }
}

impl SearchConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_uri.trim();
        if !(base.starts_with("http://") || base.starts_with("https://") || base.starts_with('/'))
        {
            return Err(ConfigError::Invalid(format!(
                "base_uri must be an http(s) URL or an absolute path, got {:?}",
                self.base_uri
            )));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be positive".to_string()));
        }
        for (name, zoom) in [("focus_zoom", self.focus_zoom), ("initial_zoom", self.initial_zoom)] {
            if !(0.0..=28.0).contains(&zoom) {
                return Err(ConfigError::Invalid(format!("{name} out of range: {zoom}")));
            }
        }
        let [lon, lat] = self.initial_center;
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::Invalid(format!(
                "initial_center out of range: [{lon}, {lat}]"
            )));
        }
        Ok(())
    }

    pub fn initial_view(&self) -> MapView {
        let [lon, lat] = self.initial_center;
        MapView::from_lon_lat(lon, lat, self.initial_zoom)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport[0], self.viewport[1])
    }
}
