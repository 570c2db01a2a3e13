//! JSONL observation log with rotation.
//!
//! Files are named `observations_<YYYYMMDD_HHMMSS>.jsonl` after the UTC
//! bucket start of their first observation, so lexical order is
//! chronological order.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::ObservationSink;
use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::station::observation::Observation;

const FILE_PREFIX: &str = "observations_";
const FILE_EXTENSION: &str = "jsonl";

/// Rotating JSON Lines writer
#[derive(Debug)]
pub struct JsonlObservationLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
}

impl JsonlObservationLogger {
    /// Create the log directory if needed. No file is opened until the
    /// first observation arrives.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        fs::create_dir_all(&config.log_dir)?;

        Ok(Self {
            log_dir: PathBuf::from(&config.log_dir),
            max_records_per_file: config.max_records_per_file.max(1),
            max_files_to_keep: config.max_files_to_keep.max(1),
            writer: None,
            current_path: None,
            records_in_file: 0,
        })
    }

    /// File currently written to
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn file_name(observation: &Observation) -> String {
        let stamp =
            DateTime::<Utc>::from_timestamp(observation.date_time, 0).unwrap_or_else(Utc::now);
        format!("{}{}.{}", FILE_PREFIX, stamp.format("%Y%m%d_%H%M%S"), FILE_EXTENSION)
    }

    fn is_log_file(path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION)
    }

    /// Close the current file and open a new one named after `observation`
    fn rotate(&mut self, observation: &Observation) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let path = self.log_dir.join(Self::file_name(observation));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!("Writing observations to {:?}", path);

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;

        self.prune()
    }

    /// Delete the oldest log files beyond the retention limit
    fn prune(&self) -> Result<()> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && Self::is_log_file(path))
            .collect();

        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            if self.current_path.as_deref() == Some(path.as_path()) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed old observation log {:?}", path),
                Err(e) => warn!("Failed to remove {:?}: {}", path, e),
            }
        }

        Ok(())
    }
}

impl ObservationSink for JsonlObservationLogger {
    fn record(&mut self, observation: &Observation) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate(observation)?;
        }

        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, observation)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            self.records_in_file += 1;
        }

        Ok(())
    }
}
