//! Spherical mercator (EPSG:3857), the display projection of the 2D map.

use std::f64::consts::{FRAC_PI_4, PI};

use super::WGS84_A;

/// Half the projected world width (meters).
pub const HALF_CIRCUMFERENCE: f64 = PI * WGS84_A;

/// Latitude at which the projected world becomes square.
pub const MAX_MERCATOR_LAT_DEG: f64 = 85.051_128_779_806_59;

/// Tile edge the zoom pyramid is defined against (pixels).
pub const TILE_SIZE_PX: f64 = 256.0;

/// Map coordinates in meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
}

impl Projected {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub fn from_lon_lat(lon_deg: f64, lat_deg: f64) -> Projected {
    let lat = lat_deg.clamp(-MAX_MERCATOR_LAT_DEG, MAX_MERCATOR_LAT_DEG);
    let x = WGS84_A * lon_deg.to_radians();
    let y = WGS84_A * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    Projected::new(x, y)
}

/// Inverse of [`from_lon_lat`]; returns `(lon_deg, lat_deg)`.
pub fn to_lon_lat(p: Projected) -> (f64, f64) {
    let lon = (p.x / WGS84_A).to_degrees();
    let lat = (2.0 * (p.y / WGS84_A).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// Meters per pixel at the given zoom level.
pub fn resolution_at_zoom(zoom: f64) -> f64 {
    2.0 * HALF_CIRCUMFERENCE / TILE_SIZE_PX / 2f64.powf(zoom)
}
