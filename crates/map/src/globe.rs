use std::f64::consts::FRAC_PI_2;

use foundation::math::{Ecef, Geodetic};

use crate::view::{MapView, Viewport};

/// Vertical field of view used to match globe altitude to 2D resolution.
pub const DEFAULT_FOV_Y_DEG: f64 = 60.0;

/// Globe camera in geographic terms.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeCamera {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub altitude_m: f64,
    pub heading_rad: f64,
    pub pitch_rad: f64,
    pub roll_rad: f64,
}

impl GlobeCamera {
    /// Camera straight above a point, north up.
    pub fn looking_down_at(lon_deg: f64, lat_deg: f64, altitude_m: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            altitude_m,
            heading_rad: 0.0,
            pitch_rad: -FRAC_PI_2,
            roll_rad: 0.0,
        }
    }

    pub fn eye(&self) -> Ecef {
        Geodetic::from_lon_lat_deg(self.lon_deg, self.lat_deg, self.altitude_m).to_ecef()
    }
}

impl Default for GlobeCamera {
    fn default() -> Self {
        Self::looking_down_at(120.1286, 23.6022, 300_000.0)
    }
}

/// Camera altitude at which the globe shows what the 2D view shows.
pub fn altitude_for_view(view: &MapView, viewport: Viewport, fov_y_rad: f64) -> f64 {
    let (_, lat) = view.center_lon_lat();
    // Mercator stretches by 1/cos(lat); ground meters shrink accordingly.
    let visible_m = view.resolution() * viewport.height as f64 * lat.to_radians().cos();
    (visible_m / 2.0) / (fov_y_rad / 2.0).tan()
}

/// Optional 3D view kept in step with the 2D map.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeView {
    enabled: bool,
    camera: GlobeCamera,
    fov_y_rad: f64,
}

impl Default for GlobeView {
    fn default() -> Self {
        Self {
            enabled: false,
            camera: GlobeCamera::default(),
            fov_y_rad: DEFAULT_FOV_Y_DEG.to_radians(),
        }
    }
}

impl GlobeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn camera(&self) -> GlobeCamera {
        self.camera
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Follows the 2D view. No-op while disabled.
    pub fn sync_from(&mut self, view: &MapView, viewport: Viewport) {
        if !self.enabled {
            return;
        }
        let (lon, lat) = view.center_lon_lat();
        let altitude = altitude_for_view(view, viewport, self.fov_y_rad);
        self.camera = GlobeCamera::looking_down_at(lon, lat, altitude);
    }
}
