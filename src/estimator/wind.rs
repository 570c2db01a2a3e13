//! # Wind Estimator
//!
//! Averages wind as a vector so that directions on both sides of north do
//! not cancel into south. Speed is the scalar mean of sample speeds; the
//! direction is the heading of the speed-weighted vector sum.

use std::f64::consts::PI;

use super::rolling::RollingAccumulator;
use super::Summary;
use crate::frame::decoder::WindSample;

/// Vector sums below this magnitude carry no usable direction
pub const WIND_VECTOR_NOISE_FLOOR: f64 = 0.01;

/// Default number of buckets in the wind window
pub const DEFAULT_WIND_WINDOW: usize = 10;

/// Mean wind over the summary's samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindAverage {
    /// Scalar mean speed in m/s
    pub speed: f64,

    /// Circular mean direction in degrees [0, 360), `None` in calm or when
    /// the samples cancel out
    pub direction: Option<f64>,
}

/// Speed-weighted vector sum of wind samples.
///
/// The vector uses mathematical orientation: `x` points east, `y` north.
#[derive(Debug, Clone, Default)]
pub struct WindSummary {
    x: f64,
    y: f64,
    speed_sum: f64,
    count: u32,
}

impl Summary for WindSummary {
    type Sample = WindSample;
    type Output = WindAverage;

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn add(&mut self, sample: &WindSample) {
        let rad = (90.0 - sample.direction).to_radians();

        self.x += sample.speed * rad.cos();
        self.y += sample.speed * rad.sin();
        self.speed_sum += sample.speed;
        self.count += 1;
    }

    fn get(&self) -> Option<WindAverage> {
        if self.count == 0 {
            return None;
        }

        let speed = self.speed_sum / self.count as f64;
        let length = self.x.hypot(self.y);

        let direction = (speed > 0.0 && length > WIND_VECTOR_NOISE_FLOOR).then(|| {
            let mut rad = (self.x / length).clamp(-1.0, 1.0).acos();
            if self.y < 0.0 {
                rad = 2.0 * PI - rad;
            }

            let degrees = 90.0 - rad.to_degrees();
            if degrees < 0.0 {
                degrees + 360.0
            } else {
                degrees
            }
        });

        Some(WindAverage { speed, direction })
    }
}

/// Wind summary over a rolling multi-minute window
pub type WindEstimator = RollingAccumulator<WindSummary>;
