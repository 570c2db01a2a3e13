//! # Packet Assembler
//!
//! Turns an ordered stream of receiver frames into minute observations.
//!
//! ## Bucketing
//!
//! Minute boundaries are detected from barometer frames (`A`/`B`), not from
//! a clock. Each barometer frame is first added to the barometer estimator;
//! if its minute differs from the open bucket, the open bucket is closed into
//! an [`Observation`] stamped with that bucket's start and every estimator
//! advances. The very first barometer frame only opens a bucket. A missing
//! barometer frame therefore delays the observation until the next one.
//!
//! ## Sensor frames
//!
//! An `I` frame that fails the CRC is dropped. A valid one always
//! contributes a wind sample and then feeds at most one of the rain,
//! temperature, gust or humidity estimators, chosen by its channel.
//!
//! ## Ordering
//!
//! Frames must arrive in non-decreasing timestamp order. A frame older than
//! its predecessor is logged and processed as-is; it may close a bucket
//! early and confuse rain counter wraparound.

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::estimator::barometer::{BarometerEstimator, BarometerSummary};
use crate::estimator::climate::{
    HumidityEstimator, HumiditySummary, TemperatureEstimator, TemperatureSummary,
};
use crate::estimator::gust::GustTracker;
use crate::estimator::rain::RainCounter;
use crate::estimator::wind::{WindEstimator, WindSummary};
use crate::frame::crc::Crc16;
use crate::frame::decoder::{
    decode_gust, decode_humidity, decode_pressure, decode_rain_ticks, decode_temperature,
    decode_wind,
};
use crate::frame::protocol::{classify, RawFrame, SensorKind};

use super::observation::{bucket_start, BucketReadings, Observation};

/// Counters describing what the assembler has seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Frames passed to `decode`
    pub frames: u64,

    /// Barometer frames accepted
    pub barometer_frames: u64,

    /// Sensor frames accepted (CRC valid)
    pub sensor_frames: u64,

    /// Sensor frames dropped for a CRC mismatch
    pub crc_failures: u64,

    /// Frames dropped as malformed (unknown type, missing or bad fields)
    pub malformed: u64,

    /// Observations emitted
    pub observations: u64,
}

/// Decoding session state: all estimators plus the open bucket.
///
/// One assembler serves one frame stream; it is not meant to be shared
/// between concurrent writers.
#[derive(Debug, Clone)]
pub struct PacketAssembler {
    crc: Crc16,
    barometer: BarometerEstimator,
    wind: WindEstimator,
    temperature: TemperatureEstimator,
    humidity: HumidityEstimator,
    rain: RainCounter,
    gust: GustTracker,
    last_bucket_start: Option<i64>,
    last_timestamp: Option<i64>,
    stats: DecodeStats,
}

impl Default for PacketAssembler {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl PacketAssembler {
    /// Create an assembler with no open bucket
    ///
    /// # Examples
    ///
    /// ```
    /// use iss_bridge::config::EngineConfig;
    /// use iss_bridge::station::assembler::PacketAssembler;
    ///
    /// let mut assembler = PacketAssembler::new(&EngineConfig::default());
    /// assert!(assembler.decode_line("B 0 0 0 97650", 0).is_none());
    /// assert_eq!(assembler.last_bucket_start(), Some(0));
    /// ```
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            crc: Crc16::new(),
            barometer: BarometerEstimator::new(
                BarometerSummary::new(config.height_m),
                config.barometer_window,
            ),
            wind: WindEstimator::new(WindSummary::default(), config.wind_window),
            temperature: TemperatureEstimator::new(
                TemperatureSummary::default(),
                config.temperature_window,
            ),
            humidity: HumidityEstimator::new(HumiditySummary::default(), config.humidity_window),
            rain: RainCounter::new(),
            gust: GustTracker::new(),
            last_bucket_start: None,
            last_timestamp: None,
            stats: DecodeStats::default(),
        }
    }

    /// Start of the open bucket, `None` before the first barometer frame
    pub fn last_bucket_start(&self) -> Option<i64> {
        self.last_bucket_start
    }

    /// Counters since creation
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Feed one frame received at `timestamp` (seconds since the epoch).
    ///
    /// Returns the observation of the previous bucket when this frame closes
    /// it. Malformed and CRC-failing frames are dropped without error.
    pub fn decode(&mut self, frame: &RawFrame, timestamp: i64) -> Option<Observation> {
        self.stats.frames += 1;

        if let Some(last) = self.last_timestamp {
            if timestamp < last {
                warn!("Frame at {} is older than previous frame at {}", timestamp, last);
            }
        }
        self.last_timestamp = Some(timestamp);

        let result = frame.frame_type().and_then(|frame_type| {
            if frame_type.is_barometer() {
                self.on_barometer(frame, timestamp)
            } else {
                self.on_sensor(frame).map(|_| None)
            }
        });

        match result {
            Ok(observation) => observation,
            Err(e) => {
                self.stats.malformed += 1;
                debug!("Dropping frame {:?}: {}", frame.to_line(), e);
                None
            }
        }
    }

    /// Tokenize a receiver line and feed it to [`decode`](Self::decode)
    pub fn decode_line(&mut self, line: &str, timestamp: i64) -> Option<Observation> {
        self.decode(&RawFrame::parse(line), timestamp)
    }

    /// Handle a barometer frame, closing the open bucket on a minute change
    fn on_barometer(&mut self, frame: &RawFrame, timestamp: i64) -> Result<Option<Observation>> {
        let reading = decode_pressure(frame)?;
        self.barometer.add(&reading);
        self.stats.barometer_frames += 1;

        let bucket = bucket_start(timestamp);

        match self.last_bucket_start {
            None => {
                debug!("Opening first bucket at {}", bucket);
                self.last_bucket_start = Some(bucket);
                Ok(None)
            }
            Some(open) if open != bucket => {
                let observation = Observation::from_readings(open, &self.readings());
                self.close_bucket();
                self.last_bucket_start = Some(bucket);
                self.stats.observations += 1;

                info!(
                    "Observation {} complete (barometer {:?} hPa, wind {:?} m/s, temp {:?} °C)",
                    observation.date_time,
                    observation.barometer,
                    observation.wind_speed,
                    observation.outside_temperature
                );
                Ok(Some(observation))
            }
            Some(_) => Ok(None),
        }
    }

    /// Handle a sensor frame: wind always, then the channel's estimator
    fn on_sensor(&mut self, frame: &RawFrame) -> Result<()> {
        if !self.crc.validate(frame) {
            self.stats.crc_failures += 1;
            debug!("CRC mismatch, dropping frame {:?}", frame.to_line());
            return Ok(());
        }

        let wind = decode_wind(frame)?;
        self.wind.add(&wind);
        self.stats.sensor_frames += 1;

        let Some(kind) = classify(frame) else {
            return Ok(());
        };
        if !kind.is_routed() {
            debug!("Ignoring {} channel", kind.name());
            return Ok(());
        }

        match kind {
            SensorKind::Rain => self.rain.add(decode_rain_ticks(frame)?),
            SensorKind::Temperature => self.temperature.add(&decode_temperature(frame)?),
            SensorKind::Gust => self.gust.add(decode_gust(frame)?),
            SensorKind::Humidity => self.humidity.add(&decode_humidity(frame)?),
            SensorKind::Other(_) => {}
        }

        Ok(())
    }

    /// Current estimator values at full precision
    fn readings(&self) -> BucketReadings {
        let rain_seen = self.rain.last_ticks().is_some();

        BucketReadings {
            barometer: self.barometer.get(),
            wind: self.wind.get(),
            gust: self.gust.get(),
            rain: rain_seen.then(|| self.rain.bucket_delta()),
            rain_total: rain_seen.then(|| self.rain.total()),
            temperature: self.temperature.get(),
            humidity: self.humidity.get(),
        }
    }

    /// Advance every estimator to a new bucket
    fn close_bucket(&mut self) {
        self.barometer.advance();
        self.wind.advance();
        self.temperature.advance();
        self.humidity.advance();
        self.rain.reset();
        self.gust.reset();
    }
}
