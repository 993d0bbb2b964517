use std::collections::VecDeque;

/// Writes queued during a reaction and applied on the next scheduling turn.
///
/// Front ends flush this from a microtask (browser) or right after the
/// reaction that queued the work (CLI).
#[derive(Debug, Clone)]
pub struct DeferredQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Takes everything queued so far, in push order.
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }
}
