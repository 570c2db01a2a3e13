//! # Rain Counter
//!
//! The rain gauge reports a free-running 7-bit tip counter. The counter
//! turns tip deltas into millimetres, handling one counter wrap between
//! consecutive frames. A gap spanning more than one full wrap (128 tips)
//! undercounts; it cannot be detected from the counter alone.

use crate::frame::decoder::RAIN_MM_PER_TIP;

/// Counter modulus of the 7-bit tip counter
const RAIN_COUNTER_MODULUS: u16 = 128;

/// Session rain total and per-bucket delta
#[derive(Debug, Clone, Default)]
pub struct RainCounter {
    total_mm: f64,
    bucket_start_mm: f64,
    last_ticks: Option<u8>,
}

impl RainCounter {
    /// Create a counter with no observations
    pub fn new() -> Self {
        Self::default()
    }

    /// Tips since `last` assuming at most one wrap
    fn tip_delta(last: u8, ticks: u8) -> u16 {
        if ticks >= last {
            (ticks - last) as u16
        } else {
            RAIN_COUNTER_MODULUS + ticks as u16 - last as u16
        }
    }

    /// Account for one tip counter observation.
    ///
    /// The first observation only establishes the baseline.
    pub fn add(&mut self, ticks: u8) {
        if let Some(last) = self.last_ticks {
            self.total_mm += Self::tip_delta(last, ticks) as f64 * RAIN_MM_PER_TIP;
        }
        self.last_ticks = Some(ticks);
    }

    /// Rain since the counter was created in mm; never reset
    pub fn total(&self) -> f64 {
        self.total_mm
    }

    /// Rain since the last bucket boundary in mm
    pub fn bucket_delta(&self) -> f64 {
        self.total_mm - self.bucket_start_mm
    }

    /// Last observed tip counter
    pub fn last_ticks(&self) -> Option<u8> {
        self.last_ticks
    }

    /// Start a new bucket; the session total is kept
    pub fn reset(&mut self) {
        self.bucket_start_mm = self.total_mm;
    }
}
