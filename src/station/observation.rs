//! # Observation Packet
//!
//! One finished minute of weather data. Values are rounded here and only
//! here; estimators keep full precision.

use serde::Serialize;

use crate::estimator::dewpoint::dew_point;
use crate::estimator::wind::WindAverage;

/// weewx unit system: metric with wind in m/s and rain in mm
pub const US_UNITS_METRICWX: i32 = 17;

/// Observation interval in minutes
pub const OBSERVATION_INTERVAL_MIN: i32 = 1;

/// Seconds per bucket
pub const BUCKET_SECONDS: i64 = 60;

/// Start of the minute bucket containing `timestamp`
pub fn bucket_start(timestamp: i64) -> i64 {
    timestamp - timestamp.rem_euclid(BUCKET_SECONDS)
}

/// Round to a number of decimals
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Estimator values at the moment a bucket closes, at full precision
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketReadings {
    /// Sea-level pressure in hPa
    pub barometer: Option<f64>,

    /// Windowed wind mean
    pub wind: Option<WindAverage>,

    /// Gust maximum of the minute in m/s
    pub gust: Option<f64>,

    /// Rain during the bucket in mm, `None` until the rain counter has a baseline
    pub rain: Option<f64>,

    /// Rain since start-up in mm, `None` until the rain counter has a baseline
    pub rain_total: Option<f64>,

    /// Outside temperature in °C
    pub temperature: Option<f64>,

    /// Outside relative humidity in percent
    pub humidity: Option<f64>,
}

/// Finished minute observation, serialized with weewx field names.
///
/// Every measurement is optional: `None` means no sample contributed, never
/// zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Bucket start, seconds since the epoch, minute aligned
    #[serde(rename = "dateTime")]
    pub date_time: i64,

    #[serde(rename = "usUnits")]
    pub us_units: i32,

    /// Interval in minutes
    pub interval: i32,

    /// hPa, one decimal
    pub barometer: Option<f64>,

    /// m/s, two decimals
    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<f64>,

    /// Degrees [0, 360), whole degrees
    #[serde(rename = "windDir")]
    pub wind_direction: Option<f64>,

    /// m/s, two decimals
    #[serde(rename = "windGust")]
    pub wind_gust: Option<f64>,

    /// mm during this minute
    pub rain: Option<f64>,

    /// mm since start-up
    #[serde(rename = "rainAccumulated")]
    pub rain_accumulated: Option<f64>,

    /// °C, one decimal
    #[serde(rename = "outTemp")]
    pub outside_temperature: Option<f64>,

    /// Percent, whole percent
    #[serde(rename = "outHumidity")]
    pub outside_humidity: Option<f64>,

    /// °C, one decimal
    #[serde(rename = "dewpoint")]
    pub dew_point: Option<f64>,
}

impl Observation {
    /// Round bucket readings into an observation stamped `date_time`
    pub fn from_readings(date_time: i64, readings: &BucketReadings) -> Self {
        let wind_direction = readings
            .wind
            .and_then(|w| w.direction)
            .map(|d| round_to(d, 0).rem_euclid(360.0));

        Self {
            date_time,
            us_units: US_UNITS_METRICWX,
            interval: OBSERVATION_INTERVAL_MIN,
            barometer: readings.barometer.map(|p| round_to(p, 1)),
            wind_speed: readings.wind.map(|w| round_to(w.speed, 2)),
            wind_direction,
            wind_gust: readings.gust.map(|g| round_to(g, 2)),
            rain: readings.rain.map(|r| round_to(r, 4)),
            rain_accumulated: readings.rain_total.map(|r| round_to(r, 4)),
            outside_temperature: readings.temperature.map(|t| round_to(t, 1)),
            outside_humidity: readings.humidity.map(|h| round_to(h, 0)),
            dew_point: dew_point(readings.temperature, readings.humidity),
        }
    }
}
