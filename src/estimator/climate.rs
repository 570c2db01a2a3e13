//! # Temperature and Humidity Estimators
//!
//! Plain arithmetic means over a rolling window.

use super::rolling::RollingAccumulator;
use super::Summary;

/// Default number of buckets in the temperature window
pub const DEFAULT_TEMPERATURE_WINDOW: usize = 5;

/// Default number of buckets in the humidity window
pub const DEFAULT_HUMIDITY_WINDOW: usize = 5;

/// Running mean of scalar samples
#[derive(Debug, Clone, Default)]
pub struct MeanSummary {
    sum: f64,
    count: u32,
}

impl Summary for MeanSummary {
    type Sample = f64;
    type Output = f64;

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn add(&mut self, sample: &f64) {
        self.sum += sample;
        self.count += 1;
    }

    fn get(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Outside temperature in °C
pub type TemperatureSummary = MeanSummary;

/// Outside relative humidity in percent
pub type HumiditySummary = MeanSummary;

/// Temperature over a rolling multi-minute window
pub type TemperatureEstimator = RollingAccumulator<TemperatureSummary>;

/// Humidity over a rolling multi-minute window
pub type HumidityEstimator = RollingAccumulator<HumiditySummary>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        let mut summary = MeanSummary::default();
        assert_eq!(summary.get(), None);

        summary.add(&20.0);
        summary.add(&21.0);
        summary.add(&-2.0);
        assert!((summary.get().unwrap() - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_is_a_value() {
        let mut summary = MeanSummary::default();
        summary.add(&0.0);
        assert_eq!(summary.get(), Some(0.0));
    }

    #[test]
    fn test_reset() {
        let mut summary = MeanSummary::default();
        summary.add(&5.0);
        summary.reset();
        assert_eq!(summary.get(), None);
    }

    #[test]
    fn test_temperature_estimator_forgets_after_full_cycle() {
        let mut estimator =
            TemperatureEstimator::new(TemperatureSummary::default(), DEFAULT_TEMPERATURE_WINDOW);
        estimator.add(&10.0);

        for _ in 0..DEFAULT_TEMPERATURE_WINDOW {
            estimator.advance();
        }
        assert_eq!(estimator.get(), None);
    }

    #[test]
    fn test_humidity_estimator_remembers_within_window() {
        let mut estimator =
            HumidityEstimator::new(HumiditySummary::default(), DEFAULT_HUMIDITY_WINDOW);
        estimator.add(&40.0);

        for _ in 0..DEFAULT_HUMIDITY_WINDOW - 1 {
            estimator.advance();
        }
        assert_eq!(estimator.get(), Some(40.0));
    }
}
