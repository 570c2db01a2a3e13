//! # Estimator Module
//!
//! Per-metric accumulation of decoded samples between minute boundaries.
//!
//! This module handles:
//! - Per-bucket summaries (wind vector, pressure, temperature, humidity)
//! - Multi-minute approximate windows via [`rolling::RollingAccumulator`]
//! - Rain tip counting with counter wraparound
//! - Per-minute gust maximum
//! - Dew point derivation

pub mod rolling;
pub mod wind;
pub mod barometer;
pub mod climate;
pub mod rain;
pub mod gust;
pub mod dewpoint;

/// A resettable running summary of one metric.
///
/// Absence of data is expressed by `get` returning `None`, never by zero.
pub trait Summary {
    /// Decoded sample accepted by `add`
    type Sample;

    /// Value reported by `get`
    type Output;

    /// Discard all accumulated samples
    fn reset(&mut self);

    /// Accumulate one sample
    fn add(&mut self, sample: &Self::Sample);

    /// Current value, `None` until a sample has been added
    fn get(&self) -> Option<Self::Output>;
}
