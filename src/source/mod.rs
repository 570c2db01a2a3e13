//! # Frame Source
//!
//! Abstraction over the store that receiver frames are captured into, so the
//! runner can be driven by a file, a database or a mock in tests.

pub mod log_file;

use async_trait::async_trait;

use crate::error::Result;
use crate::frame::protocol::RawFrame;

pub use log_file::LogFileSource;

/// One captured receiver line with its arrival time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFrame {
    /// Arrival time in milliseconds since the epoch
    pub timestamp_ms: i64,

    /// Raw receiver line, e.g. `I 100 80 05 40 2A 80 00 C3 74 -54`
    pub line: String,
}

impl StoredFrame {
    pub fn new(timestamp_ms: i64, line: impl Into<String>) -> Self {
        Self {
            timestamp_ms,
            line: line.into(),
        }
    }

    /// Arrival time in whole seconds, as the assembler expects
    pub fn timestamp_secs(&self) -> i64 {
        self.timestamp_ms.div_euclid(1000)
    }

    /// Tokenize the stored line
    pub fn frame(&self) -> RawFrame {
        RawFrame::parse(&self.line)
    }
}

/// Trait for frame store operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSource: Send {
    /// Frames with `timestamp_ms > after_ms`, ascending, at most `limit`
    async fn fetch_after(&mut self, after_ms: i64, limit: usize) -> Result<Vec<StoredFrame>>;

    /// Frames with `from_ms <= timestamp_ms <= to_ms`, ascending, at most `limit`
    async fn fetch_range(
        &mut self,
        from_ms: i64,
        to_ms: i64,
        limit: usize,
    ) -> Result<Vec<StoredFrame>>;

    /// Last processed timestamp, 0 when nothing was processed yet
    async fn load_cursor(&mut self) -> Result<i64>;

    /// Persist the last processed timestamp
    async fn store_cursor(&mut self, timestamp_ms: i64) -> Result<()>;
}
