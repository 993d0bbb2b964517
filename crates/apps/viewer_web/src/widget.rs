//! DOM for the search box, result list and detail panel.

use std::rc::Rc;

use gloo_events::EventListener;
use search::{SearchResultItem, UiState};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, Node};

/// What the user did, already mapped to the controller's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    Input(String),
    InputClicked,
    Picked(usize),
    Cancel,
    OutsideClick,
}

pub struct SearchWidget {
    root: HtmlElement,
    input: HtmlInputElement,
    cancel: HtmlElement,
    notice: HtmlElement,
    list: HtmlElement,
    detail: HtmlElement,
    content: HtmlElement,
    empty: HtmlElement,
    rendered: Vec<SearchResultItem>,
    rendered_html: String,
}

fn element<T: JsCast>(document: &Document, tag: &str, class: &str) -> Result<T, JsValue> {
    let el = document.create_element(tag)?;
    el.set_class_name(class);
    el.dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("<{tag}> has an unexpected type")))
}

impl SearchWidget {
    /// Builds the widget inside the element with id `container_id`.
    pub fn build(document: &Document, container_id: &str) -> Result<Self, JsValue> {
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{container_id}")))?;

        let root: HtmlElement = element(document, "div", "atlas-search")?;
        let input: HtmlInputElement = element(document, "input", "atlas-search-input")?;
        input.set_type("text");
        input.set_placeholder("Search places");
        let cancel: HtmlElement = element(document, "button", "atlas-search-cancel")?;
        cancel.set_text_content(Some("×"));
        let notice: HtmlElement = element(document, "div", "atlas-search-notice")?;
        let list: HtmlElement = element(document, "ul", "atlas-search-results")?;
        let detail: HtmlElement = element(document, "div", "atlas-search-detail")?;
        let content: HtmlElement = element(document, "div", "atlas-detail-content")?;
        let empty: HtmlElement = element(document, "div", "atlas-detail-empty")?;
        empty.set_text_content(Some("No detail available"));

        detail.append_child(&content)?;
        detail.append_child(&empty)?;
        let children: [&Node; 5] = [&input, &cancel, &notice, &list, &detail];
        for child in children {
            root.append_child(child)?;
        }
        container.append_child(&root)?;

        Ok(Self {
            root,
            input,
            cancel,
            notice,
            list,
            detail,
            content,
            empty,
            rendered: Vec::new(),
            rendered_html: String::new(),
        })
    }

    /// Subscribes the widget's listeners; they live as long as the returned
    /// handles.
    pub fn listen(&self, document: &Document, on: impl Fn(WidgetEvent) + 'static) -> Vec<EventListener> {
        let on = Rc::new(on);
        let mut listeners = Vec::new();

        let input = self.input.clone();
        let emit = on.clone();
        listeners.push(EventListener::new(&self.input, "input", move |_| {
            emit(WidgetEvent::Input(input.value()));
        }));

        let emit = on.clone();
        listeners.push(EventListener::new(&self.input, "click", move |_| {
            emit(WidgetEvent::InputClicked);
        }));

        let emit = on.clone();
        listeners.push(EventListener::new(&self.list, "click", move |event| {
            if let Some(index) = picked_index(event.target()) {
                emit(WidgetEvent::Picked(index));
            }
        }));

        let emit = on.clone();
        listeners.push(EventListener::new(&self.cancel, "click", move |_| {
            emit(WidgetEvent::Cancel);
        }));

        let root: Node = self.root.clone().into();
        let emit = on;
        listeners.push(EventListener::new(document, "click", move |event| {
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            if !root.contains(target.as_ref()) {
                emit(WidgetEvent::OutsideClick);
            }
        }));

        listeners
    }

    pub fn render(&mut self, ui: &UiState) -> Result<(), JsValue> {
        if self.input.value() != ui.input {
            self.input.set_value(&ui.input);
        }

        match &ui.notice {
            Some(notice) => {
                self.notice.set_text_content(Some(&notice.to_string()));
                self.notice.set_hidden(false);
            }
            None => self.notice.set_hidden(true),
        }

        if replace_if_changed(&mut self.rendered, &ui.results) {
            self.fill_list(&ui.results)?;
        }
        self.list.set_hidden(!ui.list_visible);

        self.detail.set_hidden(!ui.detail_visible);
        if replace_if_changed(&mut self.rendered_html, &ui.detail_html) {
            self.content.set_inner_html(&ui.detail_html);
        }
        self.content.set_hidden(!ui.has_detail);
        self.empty.set_hidden(ui.has_detail);
        Ok(())
    }

    fn fill_list(&self, items: &[SearchResultItem]) -> Result<(), JsValue> {
        self.list.set_inner_html("");
        let Some(document) = self.list.owner_document() else {
            return Ok(());
        };
        for (i, item) in items.iter().enumerate() {
            let li: HtmlElement = element(&document, "li", "atlas-search-item")?;
            li.set_attribute("data-index", &i.to_string())?;
            let name: HtmlElement = element(&document, "span", "atlas-search-name")?;
            name.set_text_content(Some(&item.name));
            let addr: HtmlElement = element(&document, "span", "atlas-search-addr")?;
            addr.set_text_content(Some(&item.addr));
            li.append_child(&name)?;
            li.append_child(&addr)?;
            self.list.append_child(&li)?;
        }
        Ok(())
    }

    pub fn remove(&self) {
        self.root.remove();
    }
}

/// Stores `next` in `cache` and reports whether the DOM needs updating.
fn replace_if_changed<T: PartialEq + Clone>(cache: &mut T, next: &T) -> bool {
    if cache == next {
        return false;
    }
    cache.clone_from(next);
    true
}

fn picked_index(target: Option<web_sys::EventTarget>) -> Option<usize> {
    let el = target?.dyn_into::<Element>().ok()?;
    let li = el.closest("li[data-index]").ok()??;
    li.get_attribute("data-index")?.parse().ok()
}
