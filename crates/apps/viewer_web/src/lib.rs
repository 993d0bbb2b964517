use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::Rc;

use foundation::time::Time;
use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use search::{SearchConfig, SearchController};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

pub mod http;
pub mod ol;
pub mod widget;

use http::FetchSearchService;
use ol::OlMap;
use widget::{SearchWidget, WidgetEvent};

struct App {
    controller: SearchController<OlMap>,
    widget: SearchWidget,
    service: Rc<FetchSearchService>,
    debounce: Option<Timeout>,
    _listeners: Vec<EventListener>,
}

impl App {
    fn render(&mut self) {
        if let Err(err) = self.widget.render(&self.controller.ui_state()) {
            log(&format!("render failed: {err:?}"));
        }
    }

    /// (Re)arms the browser timer for the controller's debounce deadline.
    /// Dropping the previous `Timeout` clears it.
    fn arm_debounce(&mut self) {
        self.debounce = self.controller.next_deadline().map(|deadline| {
            let delay_ms = (deadline.since(now()) * 1000.0).ceil() as u32;
            // Handled from a task so the timer is not replaced while its own
            // callback runs.
            Timeout::new(delay_ms, || spawn_local(async { on_debounce_elapsed() }))
        });
    }

    fn log_events(&mut self) {
        for event in self.controller.drain_events() {
            log(&format!("[{}] {}", event.kind, event.message));
        }
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|app| app.borrow_mut().as_mut().map(f))
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn now() -> Time {
    let ms = web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now());
    Time::from_millis(ms)
}

fn on_widget_event(event: WidgetEvent) {
    match event {
        WidgetEvent::Input(text) => {
            with_app(|app| {
                app.controller.on_key_input(text, now());
                app.arm_debounce();
            });
        }
        WidgetEvent::InputClicked => {
            with_app(|app| {
                app.controller.show_list();
                app.render();
            });
        }
        WidgetEvent::Picked(index) => on_pick(index),
        WidgetEvent::Cancel => cancel_search(),
        WidgetEvent::OutsideClick => {
            with_app(|app| {
                if app.controller.list_visible() {
                    app.controller.dismiss_list();
                    app.render();
                }
            });
        }
    }
}

fn on_debounce_elapsed() {
    let job = with_app(|app| {
        let dispatch = app.controller.poll(now());
        if dispatch.is_none() {
            app.arm_debounce();
        }
        app.log_events();
        dispatch.map(|d| (d, app.service.clone()))
    })
    .flatten();

    if let Some((dispatch, service)) = job {
        spawn_local(async move {
            let response = dispatch.run(&*service).await;
            with_app(|app| {
                if app.controller.apply_search(response) {
                    app.render();
                }
                app.log_events();
            });
        });
    }
}

fn on_pick(index: usize) {
    let job = with_app(|app| {
        let dispatch = app.controller.select_item(index);
        app.render();
        dispatch.map(|d| (d, app.service.clone()))
    })
    .flatten();

    let Some((dispatch, service)) = job else {
        return;
    };
    spawn_local(async move {
        let response = dispatch.run(&*service).await;
        let deferred = with_app(|app| {
            if app.controller.apply_detail(response) {
                app.render();
            }
            app.log_events();
            app.controller.has_deferred()
        })
        .unwrap_or(false);
        if deferred {
            // Detail content lands one microtask later, after the panel is shown.
            let _ = JsFuture::from(js_sys::Promise::resolve(&JsValue::NULL)).await;
            with_app(|app| {
                if app.controller.run_deferred() {
                    app.render();
                }
            });
        }
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Mounts the search widget into `#container_id` and the map into
/// `#map_target_id`. `config_json` may be empty for defaults.
#[wasm_bindgen]
pub fn mount(container_id: &str, map_target_id: &str, config_json: &str) -> Result<(), JsValue> {
    unmount();

    let config = if config_json.trim().is_empty() {
        SearchConfig::default()
    } else {
        SearchConfig::from_json_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let map = OlMap::mount(map_target_id, config.initial_view(), config.tile_url.clone())?;
    let service = Rc::new(FetchSearchService::new(config.base_uri.clone()));
    let mut widget = SearchWidget::build(&document, container_id)?;
    let listeners = widget.listen(&document, on_widget_event);
    let controller = SearchController::new(config, map);
    widget.render(&controller.ui_state())?;

    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            controller,
            widget,
            service,
            debounce: None,
            _listeners: listeners,
        });
    });
    Ok(())
}

/// Removes the widget and drops its listeners and pending timer. The map
/// stays where it is.
#[wasm_bindgen]
pub fn unmount() {
    let app = APP.with(|app| app.borrow_mut().take());
    if let Some(app) = app {
        app.widget.remove();
    }
}

#[wasm_bindgen]
pub fn cancel_search() {
    with_app(|app| {
        app.controller.cancel();
        app.debounce = None;
        app.render();
        app.log_events();
    });
}

/// Downloads the current map view as `map.png`.
#[wasm_bindgen]
pub fn export_map() -> Result<(), JsValue> {
    with_app(|app| app.controller.export_snapshot())
        .ok_or_else(|| JsValue::from_str("search widget is not mounted"))?
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn set_globe_enabled(enabled: bool) {
    with_app(|app| {
        app.controller.set_globe_enabled(enabled);
        app.log_events();
    });
}
