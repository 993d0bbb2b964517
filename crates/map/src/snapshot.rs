use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use layers::{MarkerLayer, rgba8};

use crate::surface::MapError;
use crate::view::{MapView, Viewport};

/// File name the viewer offers for exported views.
pub const SNAPSHOT_FILE_NAME: &str = "map.png";

const BACKGROUND: Rgba<u8> = Rgba([0xf2, 0xef, 0xe9, 0xff]);
const MARKER_RADIUS_PX: i64 = 6;

/// An encoded export of the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Draws marker layers over a plain background. Tiles are not fetched.
pub fn rasterize(view: &MapView, viewport: Viewport, layers: &[MarkerLayer]) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(viewport.width, viewport.height, BACKGROUND);
    for layer in layers {
        let (px, py) = view.pixel_of(layer.feature.position, viewport);
        draw_disc(
            &mut img,
            (px.round() as i64, py.round() as i64),
            Rgba(rgba8(layer.style.text.fill)),
        );
    }
    img
}

fn draw_disc(img: &mut RgbaImage, center: (i64, i64), color: Rgba<u8>) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let r = MARKER_RADIUS_PX;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (x, y) = (center.0 + dx, center.1 + dy);
            if x < 0 || y < 0 || x >= w || y >= h {
                continue;
            }
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

pub fn encode_png(img: &RgbaImage, file_name: &str) -> Result<Snapshot, MapError> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| MapError::Encode(e.to_string()))?;
    Ok(Snapshot {
        file_name: file_name.to_string(),
        width: img.width(),
        height: img.height(),
        png,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use layers::{MarkerFeature, MarkerStyle};

    #[test]
    fn marker_is_drawn_at_its_pixel() {
        let view = MapView::from_lon_lat(121.5, 25.0, 15.0);
        let layer = MarkerLayer::new(
            1,
            MarkerFeature::new("here", "1", 121.5, 25.0),
            MarkerStyle::default(),
        );
        let img = rasterize(&view, Viewport::new(64, 48), &[layer]);
        assert_eq!(img.get_pixel(32, 24), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(0, 0), &BACKGROUND);
    }

    #[test]
    fn offscreen_marker_leaves_background() {
        let view = MapView::from_lon_lat(0.0, 0.0, 15.0);
        let layer = MarkerLayer::new(
            1,
            MarkerFeature::new("far", "1", 90.0, 0.0),
            MarkerStyle::default(),
        );
        let img = rasterize(&view, Viewport::new(16, 16), &[layer]);
        assert!(img.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn encodes_decodable_png() {
        let img = rasterize(&MapView::from_lon_lat(0.0, 0.0, 1.0), Viewport::new(8, 4), &[]);
        let snap = encode_png(&img, SNAPSHOT_FILE_NAME).unwrap();
        assert_eq!(snap.file_name, "map.png");
        let decoded = image::load_from_memory(&snap.png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 4));
    }
}
