use foundation::math::{Projected, from_lon_lat, resolution_at_zoom, to_lon_lat};

/// Viewport size in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// 2D map view: projected center plus zoom level.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapView {
    pub center: Projected,
    pub zoom: f64,
}

impl MapView {
    pub fn new(center: Projected, zoom: f64) -> Self {
        Self { center, zoom }
    }

    pub fn from_lon_lat(lon: f64, lat: f64, zoom: f64) -> Self {
        Self::new(from_lon_lat(lon, lat), zoom)
    }

    /// `(lon_deg, lat_deg)` of the view center.
    pub fn center_lon_lat(&self) -> (f64, f64) {
        to_lon_lat(self.center)
    }

    /// Meters per pixel.
    pub fn resolution(&self) -> f64 {
        resolution_at_zoom(self.zoom)
    }

    /// Pixel position of `p` inside `viewport`, origin top-left.
    pub fn pixel_of(&self, p: Projected, viewport: Viewport) -> (f64, f64) {
        let res = self.resolution();
        let px = (p.x - self.center.x) / res + viewport.width as f64 / 2.0;
        let py = (self.center.y - p.y) / res + viewport.height as f64 / 2.0;
        (px, py)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_maps_to_viewport_middle() {
        let view = MapView::from_lon_lat(120.1286, 23.6022, 18.0);
        let (px, py) = view.pixel_of(view.center, Viewport::new(800, 600));
        assert_eq!((px, py), (400.0, 300.0));
    }

    #[test]
    fn north_is_up() {
        let view = MapView::from_lon_lat(0.0, 0.0, 10.0);
        let north = from_lon_lat(0.0, 0.01);
        let (_, py) = view.pixel_of(north, Viewport::default());
        assert!(py < 360.0);
    }

    #[test]
    fn viewport_is_never_empty() {
        assert_eq!(Viewport::new(0, 0), Viewport::new(1, 1));
    }
}
