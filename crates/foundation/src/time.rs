/// Time primitives
///
/// Seconds on a caller-defined monotonic clock. The browser feeds
/// `performance.now()`, the CLI feeds elapsed time since session start.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_millis(ms: f64) -> Self {
        Time(ms / 1000.0)
    }

    /// The instant `secs` seconds after `self`.
    pub fn after(self, secs: f64) -> Self {
        Time(self.0 + secs)
    }

    /// Seconds elapsed since `earlier`, never negative.
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn from_millis_scales_to_seconds() {
        assert_eq!(Time::from_millis(250.0), Time(0.25));
    }

    #[test]
    fn since_clamps_to_zero() {
        let a = Time(1.0);
        let b = a.after(0.5);
        assert_eq!(b.since(a), 0.5);
        assert_eq!(a.since(b), 0.0);
    }
}
