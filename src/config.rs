//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::{IssBridgeError, Result};
use crate::estimator::barometer::DEFAULT_BAROMETER_WINDOW;
use crate::estimator::climate::{DEFAULT_HUMIDITY_WINDOW, DEFAULT_TEMPERATURE_WINDOW};
use crate::estimator::wind::DEFAULT_WIND_WINDOW;

/// Largest accepted estimator window in minutes
const MAX_WINDOW: usize = 60;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub station: EngineConfig,
    pub source: SourceConfig,
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Decoding engine configuration (the `[station]` section)
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Station height above sea level in metres
    #[serde(default = "default_height_m")]
    pub height_m: f64,

    #[serde(default = "default_wind_window")]
    pub wind_window: usize,

    #[serde(default = "default_temperature_window")]
    pub temperature_window: usize,

    #[serde(default = "default_humidity_window")]
    pub humidity_window: usize,

    #[serde(default = "default_barometer_window")]
    pub barometer_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            height_m: default_height_m(),
            wind_window: default_wind_window(),
            temperature_window: default_temperature_window(),
            humidity_window: default_humidity_window(),
            barometer_window: default_barometer_window(),
        }
    }
}

/// Frame store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_frame_log")]
    pub frame_log: String,

    #[serde(default = "default_cursor_file")]
    pub cursor_file: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,

    #[serde(default = "default_warmup_window_ms")]
    pub warmup_window_ms: i64,

    #[serde(default = "default_warmup_limit")]
    pub warmup_limit: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            frame_log: default_frame_log(),
            cursor_file: default_cursor_file(),
            poll_interval_ms: default_poll_interval_ms(),
            batch_limit: default_batch_limit(),
            warmup_window_ms: default_warmup_window_ms(),
            warmup_limit: default_warmup_limit(),
        }
    }
}

/// Observation log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            format: default_log_format(),
        }
    }
}

/// Diagnostic log configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for daily-rolling log files; stdout only when unset
    #[serde(default)]
    pub dir: Option<String>,
}

// Default value functions
fn default_height_m() -> f64 { 310.8 }
fn default_wind_window() -> usize { DEFAULT_WIND_WINDOW }
fn default_temperature_window() -> usize { DEFAULT_TEMPERATURE_WINDOW }
fn default_humidity_window() -> usize { DEFAULT_HUMIDITY_WINDOW }
fn default_barometer_window() -> usize { DEFAULT_BAROMETER_WINDOW }

fn default_frame_log() -> String { "./frames.log".to_string() }
fn default_cursor_file() -> String { "./cursor.json".to_string() }
fn default_poll_interval_ms() -> u64 { 15_000 }
fn default_batch_limit() -> usize { 5000 }
fn default_warmup_window_ms() -> i64 { 600_000 }
fn default_warmup_limit() -> usize { 500 }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./observations".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_format() -> String { "jsonl".to_string() }

/// Build a validation error
fn invalid(msg: impl std::fmt::Display) -> IssBridgeError {
    IssBridgeError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use iss_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        self.station.validate()?;

        if self.source.frame_log.is_empty() {
            return Err(invalid("frame_log cannot be empty"));
        }

        if self.source.cursor_file.is_empty() {
            return Err(invalid("cursor_file cannot be empty"));
        }

        if self.source.poll_interval_ms < 100 || self.source.poll_interval_ms > 3_600_000 {
            return Err(invalid("poll_interval_ms must be between 100 and 3600000"));
        }

        if self.source.batch_limit == 0 {
            return Err(invalid("batch_limit must be greater than 0"));
        }

        if self.source.warmup_window_ms < 0 || self.source.warmup_window_ms > 86_400_000 {
            return Err(invalid("warmup_window_ms must be between 0 and 86400000"));
        }

        if self.source.warmup_limit == 0 {
            return Err(invalid("warmup_limit must be greater than 0"));
        }

        // Validate telemetry configuration
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        if matches!(self.logging.dir.as_deref(), Some("")) {
            return Err(invalid("logging dir cannot be empty when set"));
        }

        Ok(())
    }
}

impl EngineConfig {
    /// Validate station height and window sizes
    ///
    /// # Errors
    ///
    /// Returns error if the height is outside -500..=9000 m or a window is
    /// outside 1..=60 minutes
    pub fn validate(&self) -> Result<()> {
        if !self.height_m.is_finite() || self.height_m < -500.0 || self.height_m > 9000.0 {
            return Err(invalid("height_m must be between -500 and 9000"));
        }

        for (name, value) in [
            ("wind_window", self.wind_window),
            ("temperature_window", self.temperature_window),
            ("humidity_window", self.humidity_window),
            ("barometer_window", self.barometer_window),
        ] {
            if value == 0 || value > MAX_WINDOW {
                return Err(invalid(format!("{} must be between 1 and {}", name, MAX_WINDOW)));
            }
        }

        Ok(())
    }
}
