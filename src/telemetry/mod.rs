//! # Telemetry Module
//!
//! Delivery of finished observations.
//!
//! This module handles:
//! - The [`ObservationSink`] seam between the runner and any consumer
//! - Writing observations as JSONL (JSON Lines) with file rotation

pub mod logger;

use crate::error::Result;
use crate::station::observation::Observation;

pub use logger::JsonlObservationLogger;

/// Consumer of emitted observations
#[cfg_attr(test, mockall::automock)]
pub trait ObservationSink: Send {
    /// Record one observation
    fn record(&mut self, observation: &Observation) -> Result<()>;
}
