//! OpenLayers (and ol-cesium) behind [`MapSurface`].
//!
//! The page loads `ol` and, optionally, `olcs` as globals; everything here
//! goes through a small JS shim so the Rust side only deals in numbers and
//! JSON strings.

use layers::{Layer, LayerId, MarkerLayer, css_color};
use map::{GlobeView, MapError, MapSurface, MapView, Viewport};
use serde_json::json;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = "
export function atlas_ol_create(target, tileUrl, lon, lat, zoom) {
    const source = tileUrl ? new ol.source.XYZ({ url: tileUrl, crossOrigin: 'anonymous' })
                           : new ol.source.OSM({ crossOrigin: 'anonymous' });
    const map = new ol.Map({
        target,
        layers: [new ol.layer.Tile({ source })],
        view: new ol.View({ center: ol.proj.fromLonLat([lon, lat]), zoom }),
    });
    return { map, markers: new Map(), globe: null };
}

export function atlas_ol_view(handle) {
    const view = handle.map.getView();
    const c = view.getCenter() || [0, 0];
    return [c[0], c[1], view.getZoom() ?? 0];
}

export function atlas_ol_set_view(handle, x, y, zoom) {
    const view = handle.map.getView();
    view.setCenter([x, y]);
    view.setZoom(zoom);
}

export function atlas_ol_size(handle) {
    const size = handle.map.getSize() || [0, 0];
    return [size[0], size[1]];
}

export function atlas_ol_add_marker(handle, key, styleJson) {
    const s = JSON.parse(styleJson);
    const feature = new ol.Feature({ geometry: new ol.geom.Point([s.x, s.y]), name: s.label });
    feature.setStyle(new ol.style.Style({
        image: new ol.style.Icon({ src: s.icon, anchor: s.anchor }),
        text: new ol.style.Text({
            text: s.label,
            font: s.font,
            textAlign: s.align,
            offsetX: s.offset[0],
            offsetY: s.offset[1],
            fill: new ol.style.Fill({ color: s.fill }),
            stroke: new ol.style.Stroke({ color: s.halo, width: s.haloWidth }),
        }),
    }));
    const layer = new ol.layer.Vector({ source: new ol.source.Vector({ features: [feature] }) });
    handle.map.addLayer(layer);
    handle.markers.set(key, layer);
}

export function atlas_ol_remove_marker(handle, key) {
    const layer = handle.markers.get(key);
    if (!layer) return false;
    handle.map.removeLayer(layer);
    handle.markers.delete(key);
    return true;
}

export function atlas_ol_export(handle, fileName) {
    const map = handle.map;
    map.once('rendercomplete', () => {
        const size = map.getSize();
        const out = document.createElement('canvas');
        out.width = size[0];
        out.height = size[1];
        const ctx = out.getContext('2d');
        map.getViewport().querySelectorAll('.ol-layer canvas, canvas.ol-layer').forEach((canvas) => {
            if (canvas.width === 0) return;
            const opacity = canvas.parentNode.style.opacity || canvas.style.opacity;
            ctx.globalAlpha = opacity === '' ? 1 : Number(opacity);
            const m = canvas.style.transform.match(/^matrix\\(([^(]*)\\)$/);
            if (m) {
                ctx.setTransform(...m[1].split(',').map(Number));
            } else {
                ctx.setTransform(1, 0, 0, 1, 0, 0);
            }
            ctx.drawImage(canvas, 0, 0);
        });
        ctx.globalAlpha = 1;
        ctx.setTransform(1, 0, 0, 1, 0, 0);
        const link = document.createElement('a');
        link.download = fileName;
        link.href = out.toDataURL('image/png');
        link.click();
    });
    map.renderSync();
}

export function atlas_ol_set_globe(handle, enabled) {
    if (typeof olcs === 'undefined') {
        throw new Error('olcs is not loaded');
    }
    if (!handle.globe) {
        handle.globe = new olcs.OLCesium({ map: handle.map });
    }
    handle.globe.setEnabled(enabled);
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn atlas_ol_create(
        target: &str,
        tile_url: Option<String>,
        lon: f64,
        lat: f64,
        zoom: f64,
    ) -> Result<JsValue, JsValue>;

    fn atlas_ol_view(handle: &JsValue) -> Vec<f64>;

    fn atlas_ol_set_view(handle: &JsValue, x: f64, y: f64, zoom: f64);

    fn atlas_ol_size(handle: &JsValue) -> Vec<f64>;

    #[wasm_bindgen(catch)]
    fn atlas_ol_add_marker(handle: &JsValue, key: f64, style_json: &str) -> Result<(), JsValue>;

    fn atlas_ol_remove_marker(handle: &JsValue, key: f64) -> bool;

    #[wasm_bindgen(catch)]
    fn atlas_ol_export(handle: &JsValue, file_name: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn atlas_ol_set_globe(handle: &JsValue, enabled: bool) -> Result<(), JsValue>;
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

/// A live OpenLayers map mounted into a DOM element.
pub struct OlMap {
    handle: JsValue,
    layers: Vec<LayerId>,
    globe: GlobeView,
}

impl OlMap {
    pub fn mount(target_id: &str, view: MapView, tile_url: Option<String>) -> Result<Self, JsValue> {
        let (lon, lat) = view.center_lon_lat();
        let handle = atlas_ol_create(target_id, tile_url, lon, lat, view.zoom)?;
        Ok(Self {
            handle,
            layers: Vec::new(),
            globe: GlobeView::new(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        let size = atlas_ol_size(&self.handle);
        match size.as_slice() {
            [w, h] => Viewport::new(*w as u32, *h as u32),
            _ => Viewport::default(),
        }
    }
}

fn marker_style_json(layer: &MarkerLayer) -> String {
    let style = &layer.style;
    json!({
        "x": layer.feature.position.x,
        "y": layer.feature.position.y,
        "label": layer.feature.label,
        "icon": style.icon.src,
        "anchor": style.icon.anchor,
        "font": style.text.font,
        "align": style.text.align,
        "offset": style.text.offset_px,
        "fill": css_color(style.text.fill),
        "halo": css_color(style.text.halo_color),
        "haloWidth": style.text.halo_width_px,
    })
    .to_string()
}

impl MapSurface for OlMap {
    fn view(&self) -> MapView {
        match atlas_ol_view(&self.handle).as_slice() {
            [x, y, zoom] => MapView::new(foundation::math::Projected { x: *x, y: *y }, *zoom),
            _ => MapView::from_lon_lat(0.0, 0.0, 0.0),
        }
    }

    fn set_view(&mut self, view: MapView) {
        atlas_ol_set_view(&self.handle, view.center.x, view.center.y, view.zoom);
        let viewport = self.viewport();
        self.globe.sync_from(&view, viewport);
    }

    fn add_layer(&mut self, layer: MarkerLayer) {
        let id = layer.id();
        match atlas_ol_add_marker(&self.handle, id.0 as f64, &marker_style_json(&layer)) {
            Ok(()) => self.layers.push(id),
            Err(err) => log(&format!("marker layer failed: {err:?}")),
        }
    }

    fn remove_layer(&mut self, id: LayerId) -> bool {
        self.layers.retain(|l| *l != id);
        atlas_ol_remove_marker(&self.handle, id.0 as f64)
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn globe_enabled(&self) -> bool {
        self.globe.enabled()
    }

    fn set_globe_enabled(&mut self, enabled: bool) {
        if let Err(err) = atlas_ol_set_globe(&self.handle, enabled) {
            log(&format!("globe unavailable: {err:?}"));
            return;
        }
        self.globe.set_enabled(enabled);
        let view = self.view();
        let viewport = self.viewport();
        self.globe.sync_from(&view, viewport);
        let camera = self.globe.camera();
        log(&format!(
            "globe {} at altitude {:.0} m",
            if enabled { "on" } else { "off" },
            camera.altitude_m
        ));
    }

    fn export_snapshot(&mut self, file_name: &str) -> Result<(), MapError> {
        atlas_ol_export(&self.handle, file_name).map_err(|e| MapError::Bridge(format!("{e:?}")))
    }
}
