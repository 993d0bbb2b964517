use foundation::math::{Projected, from_lon_lat};

use crate::layer::{Layer, LayerId};
use crate::symbology::MarkerStyle;

/// A labeled point derived from a search result.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerFeature {
    pub label: String,
    pub place_id: String,
    pub lon_lat: [f64; 2],
    pub position: Projected,
}

impl MarkerFeature {
    pub fn new(label: impl Into<String>, place_id: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            label: label.into(),
            place_id: place_id.into(),
            lon_lat: [lon, lat],
            position: from_lon_lat(lon, lat),
        }
    }
}

/// Vector layer holding exactly one marker feature.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayer {
    id: LayerId,
    pub feature: MarkerFeature,
    pub style: MarkerStyle,
}

impl MarkerLayer {
    pub fn new(id: u64, feature: MarkerFeature, style: MarkerStyle) -> Self {
        Self {
            id: LayerId(id),
            feature,
            style,
        }
    }
}

impl Layer for MarkerLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_position_is_projected() {
        let f = MarkerFeature::new("Taipei", "7", 120.1286, 23.6022);
        assert_eq!(f.position, from_lon_lat(120.1286, 23.6022));
        assert_eq!(f.lon_lat, [120.1286, 23.6022]);
    }

    #[test]
    fn layer_reports_its_id() {
        let layer = MarkerLayer::new(
            3,
            MarkerFeature::new("a", "1", 0.0, 0.0),
            MarkerStyle::default(),
        );
        assert_eq!(layer.id(), LayerId(3));
    }
}
