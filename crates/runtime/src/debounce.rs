use foundation::time::Time;

/// Trailing-edge debouncer driven by caller-supplied time.
///
/// Each `push` replaces the pending value and restarts the quiet window; `poll`
/// releases the latest value once the window has elapsed without another push.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window_s: f64,
    pending: Option<(T, Time)>,
}

impl<T> Debouncer<T> {
    pub fn new(window_s: f64) -> Self {
        Self {
            window_s: window_s.max(0.0),
            pending: None,
        }
    }

    pub fn from_millis(window_ms: u64) -> Self {
        Self::new(window_ms as f64 / 1000.0)
    }

    pub fn push(&mut self, value: T, now: Time) {
        self.pending = Some((value, now.after(self.window_s)));
    }

    /// When the pending value becomes releasable, if any.
    pub fn deadline(&self) -> Option<Time> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn poll(&mut self, now: Time) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }
}
