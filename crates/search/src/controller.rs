//! Search-to-map interaction flow.
//!
//! The controller is sans-IO: it never awaits. Front ends feed it keystrokes
//! and clock readings, run the dispatches it hands out against a
//! [`SearchService`], and feed the responses back. Every dispatch carries a
//! [`Ticket`]; only the newest search and the newest detail request are
//! applied, so a slow response can never overwrite a fresher one.

use std::fmt;

use foundation::time::Time;
use layers::{LayerId, MarkerFeature, MarkerLayer, MarkerStyle};
use map::{MapError, MapSurface, MapView, SNAPSHOT_FILE_NAME};
use runtime::{Debouncer, DeferredQueue, Event, EventBus, SequenceGate, Ticket};
use service::{DetailQuery, DetailRecord, LocationPage, LocationQuery, SearchService, ServiceError};

use crate::config::SearchConfig;
use crate::item::SearchResultItem;

/// Transient degraded-state message shown next to the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SearchFailed(String),
    DetailFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SearchFailed(msg) => write!(f, "search unavailable: {msg}"),
            Notice::DetailFailed(msg) => write!(f, "details unavailable: {msg}"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Listing,
    Detail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDispatch {
    pub ticket: Ticket,
    pub query: LocationQuery,
}

impl SearchDispatch {
    pub async fn run<S: SearchService>(self, service: &S) -> SearchResponse {
        SearchResponse {
            ticket: self.ticket,
            result: service.locations(&self.query).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailDispatch {
    pub ticket: Ticket,
    pub query: DetailQuery,
}

impl DetailDispatch {
    pub async fn run<S: SearchService>(self, service: &S) -> DetailResponse {
        DetailResponse {
            ticket: self.ticket,
            result: service.detail(&self.query).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub ticket: Ticket,
    pub result: Result<LocationPage, ServiceError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailResponse {
    pub ticket: Ticket,
    pub result: Result<Option<DetailRecord>, ServiceError>,
}

/// Everything the search widget renders.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub input: String,
    pub results: Vec<SearchResultItem>,
    pub list_visible: bool,
    pub selected: Option<SearchResultItem>,
    pub detail_visible: bool,
    pub has_detail: bool,
    pub detail_html: String,
    pub has_marker: bool,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
enum DeferredWrite {
    DetailContent(String),
}

pub struct SearchController<M> {
    config: SearchConfig,
    map: M,
    input: String,
    results: Vec<SearchResultItem>,
    list_visible: bool,
    selected: Option<SearchResultItem>,
    detail_visible: bool,
    has_detail: bool,
    detail_html: String,
    marker: Option<LayerId>,
    next_layer_id: u64,
    notice: Option<Notice>,
    debounce: Debouncer<String>,
    searches: SequenceGate,
    details: SequenceGate,
    deferred: DeferredQueue<DeferredWrite>,
    bus: EventBus,
}

impl<M: MapSurface> SearchController<M> {
    pub fn new(config: SearchConfig, map: M) -> Self {
        let debounce = Debouncer::from_millis(config.debounce_ms);
        Self {
            config,
            map,
            input: String::new(),
            results: Vec::new(),
            list_visible: false,
            selected: None,
            detail_visible: false,
            has_detail: true,
            detail_html: String::new(),
            marker: None,
            next_layer_id: 1,
            notice: None,
            debounce,
            searches: SequenceGate::new(),
            details: SequenceGate::new(),
            deferred: DeferredQueue::new(),
            bus: EventBus::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn results(&self) -> &[SearchResultItem] {
        &self.results
    }

    pub fn list_visible(&self) -> bool {
        self.list_visible
    }

    pub fn selected(&self) -> Option<&SearchResultItem> {
        self.selected.as_ref()
    }

    pub fn detail_visible(&self) -> bool {
        self.detail_visible
    }

    pub fn has_detail(&self) -> bool {
        self.has_detail
    }

    pub fn detail_html(&self) -> &str {
        &self.detail_html
    }

    pub fn marker(&self) -> Option<LayerId> {
        self.marker
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.bus.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    pub fn phase(&self) -> Phase {
        if self.selected.is_some() {
            Phase::Detail
        } else if !self.results.is_empty() {
            Phase::Listing
        } else {
            Phase::Idle
        }
    }

    pub fn ui_state(&self) -> UiState {
        UiState {
            input: self.input.clone(),
            results: self.results.clone(),
            list_visible: self.list_visible,
            selected: self.selected.clone(),
            detail_visible: self.detail_visible,
            has_detail: self.has_detail,
            detail_html: self.detail_html.clone(),
            has_marker: self.marker.is_some(),
            notice: self.notice.clone(),
        }
    }

    /// Records a keystroke and restarts the debounce window.
    pub fn on_key_input(&mut self, text: impl Into<String>, now: Time) {
        let text = text.into();
        self.input.clone_from(&text);
        self.debounce.push(text, now);
    }

    /// When [`Self::poll`] should next be called, if a search is pending.
    pub fn next_deadline(&self) -> Option<Time> {
        self.debounce.deadline()
    }

    /// Hands out the search for the latest input once the input went quiet.
    ///
    /// Issuing a new dispatch makes every earlier one stale.
    pub fn poll(&mut self, now: Time) -> Option<SearchDispatch> {
        let name = self.debounce.poll(now)?;
        let ticket = self.searches.issue();
        self.bus
            .emit("search.dispatch", format!("#{} {name:?}", ticket.0));
        Some(SearchDispatch {
            ticket,
            query: LocationQuery::first_page(name, self.config.page_size),
        })
    }

    /// Returns `false` when the response was stale and ignored.
    pub fn apply_search(&mut self, response: SearchResponse) -> bool {
        if !self.searches.is_current(response.ticket) {
            self.bus
                .emit("search.stale", format!("#{}", response.ticket.0));
            return false;
        }
        match response.result {
            Ok(page) => {
                self.results = page.list.into_iter().map(SearchResultItem::from).collect();
                self.list_visible = true;
                if matches!(self.notice, Some(Notice::SearchFailed(_))) {
                    self.notice = None;
                }
                self.bus.emit(
                    "search.apply",
                    format!("#{} {} results", response.ticket.0, self.results.len()),
                );
            }
            Err(err) => {
                self.bus
                    .emit("search.error", format!("#{} {err}", response.ticket.0));
                self.notice = Some(Notice::SearchFailed(err.to_string()));
            }
        }
        true
    }

    /// Clicking into the search box re-opens the list.
    pub fn show_list(&mut self) {
        self.list_visible = true;
    }

    /// Click outside the widget.
    pub fn dismiss_list(&mut self) {
        self.list_visible = false;
    }

    pub fn select_item(&mut self, index: usize) -> Option<DetailDispatch> {
        let item = self.results.get(index)?.clone();
        Some(self.select(item))
    }

    /// Makes `item` the selection and returns the detail request for it.
    ///
    /// The map moves once the detail response arrives.
    pub fn select(&mut self, item: SearchResultItem) -> DetailDispatch {
        self.input.clone_from(&item.name);
        self.list_visible = false;
        let ticket = self.details.issue();
        self.bus
            .emit("detail.dispatch", format!("#{} {:?}", ticket.0, item.name));
        let query = DetailQuery {
            name: item.name.clone(),
        };
        self.selected = Some(item);
        DetailDispatch { ticket, query }
    }

    /// Recenters, replaces the marker and fills the detail panel.
    ///
    /// Detail content is queued; it lands on [`Self::run_deferred`].
    /// Returns `false` when the response was stale and ignored.
    pub fn apply_detail(&mut self, response: DetailResponse) -> bool {
        if !self.details.is_current(response.ticket) {
            self.bus
                .emit("detail.stale", format!("#{}", response.ticket.0));
            return false;
        }
        let Some(item) = self.selected.clone() else {
            return false;
        };

        self.focus(&item);
        self.detail_visible = true;
        self.deferred.clear();

        match response.result {
            Ok(record) => {
                if matches!(self.notice, Some(Notice::DetailFailed(_))) {
                    self.notice = None;
                }
                match record.as_ref().and_then(DetailRecord::content) {
                    Some(html) => {
                        self.has_detail = true;
                        self.deferred.push(DeferredWrite::DetailContent(html.to_string()));
                    }
                    None => {
                        self.has_detail = false;
                        self.detail_html.clear();
                    }
                }
                self.bus.emit(
                    "detail.apply",
                    format!("#{} has_detail={}", response.ticket.0, self.has_detail),
                );
            }
            Err(err) => {
                self.bus
                    .emit("detail.error", format!("#{} {err}", response.ticket.0));
                self.has_detail = false;
                self.detail_html.clear();
                self.notice = Some(Notice::DetailFailed(err.to_string()));
            }
        }
        true
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Applies writes queued by the previous reaction. Returns `true` if
    /// anything changed.
    pub fn run_deferred(&mut self) -> bool {
        let writes = self.deferred.drain();
        let changed = !writes.is_empty();
        for write in writes {
            match write {
                DeferredWrite::DetailContent(html) => self.detail_html = html,
            }
        }
        changed
    }

    /// Back to the initial state. In-flight responses become stale.
    pub fn cancel(&mut self) {
        self.list_visible = false;
        self.detail_visible = false;
        self.has_detail = true;
        self.results.clear();
        self.input.clear();
        self.detail_html.clear();
        self.selected = None;
        self.notice = None;
        self.deferred.clear();
        self.debounce.cancel();
        self.searches.invalidate();
        self.details.invalidate();
        if let Some(id) = self.marker.take() {
            self.map.remove_layer(id);
        }
        self.bus.emit("cancel", "");
    }

    pub fn export_snapshot(&mut self) -> Result<(), MapError> {
        self.map.export_snapshot(SNAPSHOT_FILE_NAME)?;
        self.bus.emit("export", SNAPSHOT_FILE_NAME);
        Ok(())
    }

    pub fn set_globe_enabled(&mut self, enabled: bool) {
        self.map.set_globe_enabled(enabled);
        self.bus.emit("globe", if enabled { "on" } else { "off" });
    }

    fn focus(&mut self, item: &SearchResultItem) {
        self.map
            .set_view(MapView::from_lon_lat(item.x, item.y, self.config.focus_zoom));
        self.place_marker(item);
    }

    fn place_marker(&mut self, item: &SearchResultItem) {
        if let Some(prev) = self.marker.take() {
            self.map.remove_layer(prev);
        }
        let id = self.next_layer_id;
        self.next_layer_id += 1;
        let layer = MarkerLayer::new(
            id,
            MarkerFeature::new(&item.name, item.id.to_string(), item.x, item.y),
            MarkerStyle::with_icon(&self.config.marker_icon),
        );
        self.map.add_layer(layer);
        self.marker = Some(LayerId(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::from_lon_lat;
    use layers::Layer;
    use map::{MapModel, Viewport};
    use pretty_assertions::assert_eq;
    use service::{LocationRecord, PlaceId};

    fn controller() -> SearchController<MapModel> {
        let config = SearchConfig {
            viewport: [64, 48],
            ..SearchConfig::default()
        };
        let map = MapModel::new(config.initial_view(), Viewport::new(64, 48));
        SearchController::new(config, map)
    }

    fn record(name: &str, x: f64, y: f64, addr: &str) -> LocationRecord {
        LocationRecord {
            name: name.to_string(),
            x,
            y,
            addr: Some(addr.to_string()),
            id: PlaceId::Text(name.to_lowercase()),
        }
    }

    fn taipei_page() -> LocationPage {
        LocationPage {
            list: vec![
                record("Taipei Main Station", 121.5170, 25.0478, "null"),
                record("Taiwan Center", 120.1286, 23.6022, "Nantou"),
                record("Taipei 101", 121.5645, 25.0339, "Xinyi"),
            ],
        }
    }

    fn search(c: &mut SearchController<MapModel>, text: &str, at: Time) -> SearchDispatch {
        c.on_key_input(text, at);
        c.poll(at.after(0.25)).expect("dispatch after quiet window")
    }

    fn listed(c: &mut SearchController<MapModel>) {
        let d = search(c, "taipei", Time::ZERO);
        assert!(c.apply_search(SearchResponse {
            ticket: d.ticket,
            result: Ok(taipei_page()),
        }));
    }

    fn detail(ticket: Ticket, wiki: Option<&str>, baidu: Option<&str>) -> DetailResponse {
        DetailResponse {
            ticket,
            result: Ok(Some(DetailRecord {
                wiki: wiki.map(str::to_string),
                baidu: baidu.map(str::to_string),
            })),
        }
    }

    #[test]
    fn starts_idle() {
        let c = controller();
        assert_eq!(c.phase(), Phase::Idle);
        assert!(c.has_detail());
        assert!(!c.list_visible());
        assert_eq!(c.map().layer_count(), 0);
    }

    #[test]
    fn keystrokes_inside_window_dispatch_once_with_last_value() {
        let mut c = controller();
        let mut dispatches = Vec::new();
        for (i, text) in ["t", "ta", "tai", "taip", "taipe", "taipei"].iter().enumerate() {
            let now = Time(i as f64 * 0.125);
            dispatches.extend(c.poll(now));
            c.on_key_input(*text, now);
        }
        assert_eq!(c.next_deadline(), Some(Time(0.875)));
        dispatches.extend(c.poll(Time(0.75)));
        dispatches.extend(c.poll(Time(0.875)));
        dispatches.extend(c.poll(Time(5.0)));

        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].query, LocationQuery::first_page("taipei", 10));
        assert_eq!(c.input(), "taipei");
    }

    #[test]
    fn search_response_normalizes_and_shows_list() {
        let mut c = controller();
        listed(&mut c);
        assert_eq!(c.phase(), Phase::Listing);
        assert!(c.list_visible());
        let addrs: Vec<_> = c.results().iter().map(|i| i.addr.as_str()).collect();
        assert_eq!(addrs, vec!["", "Nantou", "Xinyi"]);
    }

    #[test]
    fn stale_search_response_is_discarded() {
        let mut c = controller();
        let old = search(&mut c, "tai", Time::ZERO);
        let new = search(&mut c, "taipei", Time(1.0));

        assert!(c.apply_search(SearchResponse {
            ticket: new.ticket,
            result: Ok(taipei_page()),
        }));
        assert!(!c.apply_search(SearchResponse {
            ticket: old.ticket,
            result: Ok(LocationPage {
                list: vec![record("Tainan", 120.2, 23.0, "")],
            }),
        }));
        assert_eq!(c.results().len(), 3);
        assert_eq!(c.events().filter(|e| e.kind == "search.stale").count(), 1);
    }

    #[test]
    fn failed_search_keeps_previous_list() {
        let mut c = controller();
        listed(&mut c);
        let d = search(&mut c, "taipeix", Time(2.0));
        assert!(c.apply_search(SearchResponse {
            ticket: d.ticket,
            result: Err(ServiceError::Status(502)),
        }));
        assert_eq!(c.results().len(), 3);
        assert!(matches!(c.notice(), Some(Notice::SearchFailed(_))));

        let d = search(&mut c, "taipei", Time(3.0));
        c.apply_search(SearchResponse {
            ticket: d.ticket,
            result: Ok(taipei_page()),
        });
        assert_eq!(c.notice(), None);
    }

    #[test]
    fn selecting_item_two_centers_and_marks_it() {
        let mut c = controller();
        listed(&mut c);

        let d = c.select_item(1).unwrap();
        assert_eq!(d.query.name, "Taiwan Center");
        assert_eq!(c.input(), "Taiwan Center");
        assert!(!c.list_visible());
        assert_eq!(c.map().layer_count(), 0);

        assert!(c.apply_detail(detail(d.ticket, Some("<p>center</p>"), None)));
        let view = c.map().view();
        assert_eq!(view.center, from_lon_lat(120.1286, 23.6022));
        assert_eq!(view.zoom, 18.0);

        let layers = c.map().layers();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].feature.label, "Taiwan Center");
        assert_eq!(layers[0].style.icon.src, "assets/images/mark.png");
        assert_eq!(Some(layers[0].id()), c.marker());
        assert!(c.detail_visible());
        assert_eq!(c.phase(), Phase::Detail);
    }

    #[test]
    fn reselecting_keeps_exactly_one_marker_at_latest_item() {
        let mut c = controller();
        listed(&mut c);

        let first = c.select_item(0).unwrap();
        c.apply_detail(detail(first.ticket, Some("a"), None));
        let second = c.select_item(2).unwrap();
        c.apply_detail(detail(second.ticket, Some("b"), None));

        let layers = c.map().layers();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].feature.position, from_lon_lat(121.5645, 25.0339));
        assert_eq!(layers[0].feature.label, "Taipei 101");
    }

    #[test]
    fn detail_content_lands_on_next_turn() {
        let mut c = controller();
        listed(&mut c);
        let d = c.select_item(0).unwrap();
        c.apply_detail(detail(d.ticket, Some("<p>wiki</p>"), Some("<p>baidu</p>")));

        assert!(c.has_detail());
        assert_eq!(c.detail_html(), "");
        assert!(c.has_deferred());
        assert!(c.run_deferred());
        assert_eq!(c.detail_html(), "<p>wiki</p>");
        assert!(!c.run_deferred());
    }

    #[test]
    fn detail_falls_back_to_second_source() {
        let mut c = controller();
        listed(&mut c);
        let d = c.select_item(0).unwrap();
        c.apply_detail(detail(d.ticket, None, Some("<p>baidu</p>")));
        c.run_deferred();
        assert!(c.has_detail());
        assert_eq!(c.detail_html(), "<p>baidu</p>");
    }

    #[test]
    fn empty_detail_marks_no_detail() {
        for result in [Ok(None), Ok(Some(DetailRecord::default()))] {
            let mut c = controller();
            listed(&mut c);
            let d = c.select_item(0).unwrap();
            c.apply_detail(DetailResponse {
                ticket: d.ticket,
                result,
            });
            assert!(!c.has_detail());
            assert!(c.detail_visible());
            assert!(!c.run_deferred());
            assert_eq!(c.detail_html(), "");
            assert_eq!(c.notice(), None);
            assert_eq!(c.map().layer_count(), 1);
        }
    }

    #[test]
    fn failed_detail_still_moves_map() {
        let mut c = controller();
        listed(&mut c);
        let d = c.select_item(2).unwrap();
        c.apply_detail(DetailResponse {
            ticket: d.ticket,
            result: Err(ServiceError::Transport("timed out".to_string())),
        });
        assert_eq!(c.map().layer_count(), 1);
        assert!(!c.has_detail());
        assert!(matches!(c.notice(), Some(Notice::DetailFailed(_))));
    }

    #[test]
    fn stale_detail_response_is_discarded() {
        let mut c = controller();
        listed(&mut c);
        let first = c.select_item(0).unwrap();
        let second = c.select_item(1).unwrap();

        assert!(c.apply_detail(detail(second.ticket, Some("second"), None)));
        assert!(!c.apply_detail(detail(first.ticket, Some("first"), None)));
        c.run_deferred();

        assert_eq!(c.detail_html(), "second");
        assert_eq!(c.map().view().center, from_lon_lat(120.1286, 23.6022));
    }

    #[test]
    fn typing_after_selection_keeps_marker() {
        let mut c = controller();
        listed(&mut c);
        let d = c.select_item(0).unwrap();
        c.apply_detail(detail(d.ticket, Some("x"), None));

        let again = search(&mut c, "tainan", Time(10.0));
        c.apply_search(SearchResponse {
            ticket: again.ticket,
            result: Ok(LocationPage::default()),
        });
        assert_eq!(c.map().layer_count(), 1);
        assert!(c.selected().is_some());
    }

    #[test]
    fn cancel_restores_initial_state_and_is_idempotent() {
        let initial = controller().ui_state();

        let mut c = controller();
        listed(&mut c);
        let d = c.select_item(1).unwrap();
        c.apply_detail(detail(d.ticket, Some("x"), None));
        c.run_deferred();

        c.cancel();
        assert_eq!(c.ui_state(), initial);
        assert_eq!(c.map().layer_count(), 0);
        assert_eq!(c.phase(), Phase::Idle);

        c.cancel();
        assert_eq!(c.ui_state(), initial);
    }

    #[test]
    fn cancel_drops_pending_work() {
        let mut c = controller();
        listed(&mut c);
        let d = c.select_item(0).unwrap();
        c.apply_detail(detail(d.ticket, Some("late"), None));
        let pending = search(&mut c, "tai", Time(4.0));
        c.on_key_input("taipei", Time(5.0));

        c.cancel();
        assert!(!c.run_deferred());
        assert_eq!(c.detail_html(), "");
        assert_eq!(c.next_deadline(), None);
        assert!(!c.apply_search(SearchResponse {
            ticket: pending.ticket,
            result: Ok(taipei_page()),
        }));
        assert!(c.results().is_empty());
    }

    #[test]
    fn list_visibility_follows_clicks() {
        let mut c = controller();
        listed(&mut c);
        c.dismiss_list();
        assert!(!c.list_visible());
        c.show_list();
        assert!(c.list_visible());
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let mut c = controller();
        listed(&mut c);
        assert_eq!(c.select_item(9), None);
        assert_eq!(c.selected(), None);
    }

    #[test]
    fn export_renders_marker_at_center() {
        let mut c = controller();
        listed(&mut c);
        let d = c.select_item(1).unwrap();
        c.apply_detail(detail(d.ticket, Some("x"), None));

        c.export_snapshot().unwrap();
        let snap = c.map().last_snapshot().unwrap();
        assert_eq!(snap.file_name, "map.png");
        let img = image::load_from_memory(&snap.png).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(32, 24).0, [255, 0, 0, 255]);
    }

    #[test]
    fn globe_toggle_reaches_map() {
        let mut c = controller();
        c.set_globe_enabled(true);
        assert!(c.map().globe_enabled());
        c.set_globe_enabled(false);
        assert!(!c.map().globe_enabled());
    }
}
