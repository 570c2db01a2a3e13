//! # Barometer Estimator
//!
//! Averages sea-level pressure. Station pressure readings are projected to
//! sea level with the international barometric formula:
//!
//! `p0 = (p ^ 0.1902614 + 8.417168e-05 * h) ^ 5.255927`

use super::rolling::RollingAccumulator;
use super::Summary;
use crate::frame::decoder::{PressureKind, PressureReading};

/// Exponent applied to station pressure
const BAROMETRIC_EXPONENT: f64 = 0.1902614;

/// Height coefficient per metre
const BAROMETRIC_HEIGHT_COEFF: f64 = 8.417168e-05;

/// Inverse exponent projecting back to pressure
const BAROMETRIC_INVERSE_EXPONENT: f64 = 5.255927;

/// Default number of buckets in the barometer window
pub const DEFAULT_BAROMETER_WINDOW: usize = 10;

/// Project station pressure (hPa) at `height_m` to sea level (hPa)
pub fn sea_level_pressure(station_hpa: f64, height_m: f64) -> f64 {
    (station_hpa.powf(BAROMETRIC_EXPONENT) + BAROMETRIC_HEIGHT_COEFF * height_m)
        .powf(BAROMETRIC_INVERSE_EXPONENT)
}

/// Mean sea-level pressure for a station at a fixed height
#[derive(Debug, Clone)]
pub struct BarometerSummary {
    height_m: f64,
    sum: f64,
    count: u32,
}

impl BarometerSummary {
    /// Empty summary for a station `height_m` metres above sea level
    pub fn new(height_m: f64) -> Self {
        Self {
            height_m,
            sum: 0.0,
            count: 0,
        }
    }
}

impl Summary for BarometerSummary {
    type Sample = PressureReading;
    type Output = f64;

    fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }

    fn add(&mut self, reading: &PressureReading) {
        self.sum += match reading.kind {
            PressureKind::SeaLevel => reading.hpa,
            PressureKind::Station => sea_level_pressure(reading.hpa, self.height_m),
        };
        self.count += 1;
    }

    fn get(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Barometer summary over a rolling multi-minute window
pub type BarometerEstimator = RollingAccumulator<BarometerSummary>;

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(kind: PressureKind, hpa: f64) -> PressureReading {
        PressureReading { kind, hpa }
    }

    #[test]
    fn test_sea_level_at_zero_height_is_identity() {
        // The two exponents are rounded, so the round trip is only close
        let p = sea_level_pressure(1013.25, 0.0);
        assert!((p - 1013.25).abs() < 1e-3);
    }

    #[test]
    fn test_sea_level_projection() {
        // ~12 hPa per 100 m near sea level
        let p = sea_level_pressure(976.5, 310.8);
        assert!((p - 1013.3).abs() < 0.05, "got {}", p);
        assert!(p > 976.5);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(BarometerSummary::new(310.8).get(), None);
    }

    #[test]
    fn test_direct_readings_are_not_projected() {
        let mut summary = BarometerSummary::new(310.8);
        summary.add(&reading(PressureKind::SeaLevel, 1010.0));
        summary.add(&reading(PressureKind::SeaLevel, 1012.0));
        assert_eq!(summary.get(), Some(1011.0));
    }

    #[test]
    fn test_station_readings_are_projected() {
        let mut summary = BarometerSummary::new(310.8);
        summary.add(&reading(PressureKind::Station, 976.5));
        let expected = sea_level_pressure(976.5, 310.8);
        assert!((summary.get().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reset_keeps_height() {
        let mut summary = BarometerSummary::new(120.0);
        summary.add(&reading(PressureKind::SeaLevel, 1000.0));
        summary.reset();
        assert_eq!(summary.get(), None);

        summary.add(&reading(PressureKind::Station, 980.0));
        let expected = sea_level_pressure(980.0, 120.0);
        assert!((summary.get().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_barometer_estimator() {
        let mut estimator =
            BarometerEstimator::new(BarometerSummary::new(0.0), DEFAULT_BAROMETER_WINDOW);
        assert_eq!(estimator.get(), None);

        estimator.add(&reading(PressureKind::SeaLevel, 1000.0));
        estimator.advance();
        estimator.add(&reading(PressureKind::SeaLevel, 1002.0));
        assert_eq!(estimator.get(), Some(1001.0));
    }
}
