//! Frame store backed by a plain text capture file.
//!
//! Each record is one line, `<timestamp_ms> <frame tokens...>`:
//!
//! ```text
//! # captured by the receiver logger
//! 1700000001234 B 0 0 0 97650
//! 1700000003456 I 100 80 05 40 2A 80 00 C3 74 -54
//! ```
//!
//! The file is append-only and records are expected in arrival order. Blank
//! lines, `#` comments and records without a numeric timestamp are skipped;
//! a record is read only once its terminating newline has been written.
//!
//! Reads stream the file and stop at the batch limit, never splitting a run
//! of records that share a timestamp. The byte offset where a batch ended is
//! remembered so the next poll resumes there instead of rescanning history.
//! The cursor lives in a separate JSON file so the capture file is never
//! rewritten.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tracing::debug;

use super::{FrameSource, StoredFrame};
use crate::config::SourceConfig;
use crate::error::Result;

/// Persisted cursor document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Cursor {
    last_timestamp_ms: i64,
}

/// Where the previous `fetch_after` batch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResumePoint {
    /// Timestamp the next `fetch_after` is expected to be called with
    after_ms: i64,

    /// Byte offset of the first record not yet returned
    offset: u64,
}

/// Records read by one pass over the capture file
#[derive(Debug)]
struct Batch {
    frames: Vec<StoredFrame>,
    end_offset: u64,
}

/// [`FrameSource`] reading a capture file
#[derive(Debug, Clone)]
pub struct LogFileSource {
    frame_log: PathBuf,
    cursor_file: PathBuf,
    resume: Option<ResumePoint>,
}

impl LogFileSource {
    pub fn new(frame_log: impl Into<PathBuf>, cursor_file: impl Into<PathBuf>) -> Self {
        Self {
            frame_log: frame_log.into(),
            cursor_file: cursor_file.into(),
            resume: None,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.frame_log, &config.cursor_file)
    }

    pub fn frame_log(&self) -> &Path {
        &self.frame_log
    }

    /// Parse one capture record, `None` for anything that is not a frame
    fn parse_record(line: &str) -> Option<StoredFrame> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (timestamp, frame) = line.split_once(char::is_whitespace)?;
        let timestamp_ms = timestamp.parse::<i64>().ok()?;
        let frame = frame.trim();
        if frame.is_empty() {
            return None;
        }

        Some(StoredFrame::new(timestamp_ms, frame))
    }

    /// Read records with `from_ms <= timestamp_ms <= to_ms` starting at
    /// byte `offset`.
    ///
    /// Stops at the first record past `to_ms`, or once `limit` records are
    /// collected and the next record has a different timestamp.
    async fn scan(&self, offset: u64, from_ms: i64, to_ms: i64, limit: usize) -> Result<Batch> {
        let file = match File::open(&self.frame_log).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Frame log {:?} does not exist yet", self.frame_log);
                return Ok(Batch {
                    frames: Vec::new(),
                    end_offset: 0,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let length = file.metadata().await?.len();
        let mut offset = if offset > length {
            debug!("Frame log {:?} shrank, reading from the start", self.frame_log);
            0
        } else {
            offset
        };

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset)).await?;

        let mut frames: Vec<StoredFrame> = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf).await?;
            if read == 0 || buf.last() != Some(&b'\n') {
                // End of file, or a record still being written
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            match Self::parse_record(&line) {
                Some(frame) => {
                    if frame.timestamp_ms > to_ms {
                        break;
                    }
                    let last_ms = frames.last().map(|f| f.timestamp_ms);
                    if frames.len() >= limit && last_ms != Some(frame.timestamp_ms) {
                        break;
                    }
                    if frame.timestamp_ms >= from_ms {
                        frames.push(frame);
                    }
                }
                None => {
                    let line = line.trim();
                    if !line.is_empty() && !line.starts_with('#') {
                        debug!("Skipping unparseable record {:?}", line);
                    }
                }
            }

            offset += read as u64;
        }

        Ok(Batch {
            frames,
            end_offset: offset,
        })
    }
}

#[async_trait]
impl FrameSource for LogFileSource {
    async fn fetch_after(&mut self, after_ms: i64, limit: usize) -> Result<Vec<StoredFrame>> {
        let start = match self.resume {
            Some(resume) if resume.after_ms == after_ms => resume.offset,
            _ => 0,
        };

        let batch = self
            .scan(start, after_ms.saturating_add(1), i64::MAX, limit)
            .await?;

        self.resume = Some(ResumePoint {
            after_ms: batch.frames.last().map_or(after_ms, |f| f.timestamp_ms),
            offset: batch.end_offset,
        });

        Ok(batch.frames)
    }

    async fn fetch_range(
        &mut self,
        from_ms: i64,
        to_ms: i64,
        limit: usize,
    ) -> Result<Vec<StoredFrame>> {
        Ok(self.scan(0, from_ms, to_ms, limit).await?.frames)
    }

    async fn load_cursor(&mut self) -> Result<i64> {
        match tokio::fs::read_to_string(&self.cursor_file).await {
            Ok(content) => {
                let cursor: Cursor = serde_json::from_str(&content)?;
                Ok(cursor.last_timestamp_ms)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    async fn store_cursor(&mut self, timestamp_ms: i64) -> Result<()> {
        let document = serde_json::to_string(&Cursor {
            last_timestamp_ms: timestamp_ms,
        })?;

        // Write then rename so a crash never leaves a truncated cursor
        let mut staging = self.cursor_file.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        tokio::fs::write(&staging, document).await?;
        tokio::fs::rename(&staging, &self.cursor_file).await?;

        debug!("Cursor stored at {}", timestamp_ms);
        Ok(())
    }
}
