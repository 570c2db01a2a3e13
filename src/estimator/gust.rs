//! # Gust Tracker
//!
//! Highest gust speed seen in the current minute. Not windowed.

/// Per-minute gust maximum
#[derive(Debug, Clone, Default)]
pub struct GustTracker {
    max: f64,
    count: u32,
}

impl GustTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one gust speed in m/s
    pub fn add(&mut self, speed: f64) {
        if speed > self.max {
            self.max = speed;
        }
        self.count += 1;
    }

    /// Maximum gust of the minute.
    ///
    /// `None` only when nothing was added and the maximum is still zero.
    pub fn get(&self) -> Option<f64> {
        (self.count > 0 || self.max > 0.0).then_some(self.max)
    }

    /// Start a new minute
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
