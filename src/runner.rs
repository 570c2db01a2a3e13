//! # Runner
//!
//! Pulls frames from a [`FrameSource`], feeds them through the
//! [`PacketAssembler`] and hands finished observations to an
//! [`ObservationSink`]. The binary drives [`Runner::poll_once`] on a timer.

use tracing::{debug, error, info};

use crate::config::{EngineConfig, SourceConfig};
use crate::error::Result;
use crate::source::FrameSource;
use crate::station::assembler::PacketAssembler;
use crate::station::observation::Observation;
use crate::telemetry::ObservationSink;

/// Polling state for one frame source
pub struct Runner<S: FrameSource> {
    source: S,
    assembler: PacketAssembler,
    sink: Option<Box<dyn ObservationSink>>,
    config: SourceConfig,
    cursor_ms: i64,
    stored_cursor_ms: i64,
}

impl<S: FrameSource> Runner<S> {
    pub fn new(source: S, engine: &EngineConfig, config: SourceConfig) -> Self {
        Self {
            source,
            assembler: PacketAssembler::new(engine),
            sink: None,
            config,
            cursor_ms: 0,
            stored_cursor_ms: 0,
        }
    }

    /// Attach a consumer for emitted observations
    pub fn with_sink(mut self, sink: Box<dyn ObservationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Timestamp of the last frame processed, in milliseconds
    pub fn cursor(&self) -> i64 {
        self.cursor_ms
    }

    pub fn assembler(&self) -> &PacketAssembler {
        &self.assembler
    }

    /// Load the cursor and replay recent history to prime the estimators.
    ///
    /// Replayed observations are discarded; they were delivered by a previous
    /// run. Returns the number of frames replayed.
    pub async fn warm_up(&mut self) -> Result<usize> {
        self.cursor_ms = self.source.load_cursor().await?;
        self.stored_cursor_ms = self.cursor_ms;

        let from_ms = self.cursor_ms - self.config.warmup_window_ms;
        if from_ms < 0 {
            info!("Cursor at {}, nothing to replay", self.cursor_ms);
            return Ok(0);
        }

        let frames = self
            .source
            .fetch_range(from_ms, self.cursor_ms, self.config.warmup_limit)
            .await?;

        for frame in &frames {
            let _ = self.assembler.decode(&frame.frame(), frame.timestamp_secs());
        }

        info!(
            "Replayed {} frames from {} to {} to prime estimators",
            frames.len(),
            from_ms,
            self.cursor_ms
        );
        Ok(frames.len())
    }

    /// Process every frame after the cursor, up to the batch limit.
    ///
    /// The in-memory cursor always matches what the assembler has consumed.
    /// A failing sink or cursor store is logged and does not stop the batch;
    /// an unsaved cursor is stored again on the next poll.
    pub async fn poll_once(&mut self) -> Result<Vec<Observation>> {
        let frames = self
            .source
            .fetch_after(self.cursor_ms, self.config.batch_limit)
            .await?;

        let mut observations = Vec::new();
        for frame in &frames {
            let Some(observation) = self.assembler.decode(&frame.frame(), frame.timestamp_secs())
            else {
                continue;
            };

            if let Some(sink) = self.sink.as_mut() {
                if let Err(e) = sink.record(&observation) {
                    error!("Failed to record observation {}: {}", observation.date_time, e);
                }
            }
            observations.push(observation);
        }

        if let Some(last) = frames.last() {
            self.cursor_ms = last.timestamp_ms;
        }

        if self.cursor_ms != self.stored_cursor_ms {
            match self.source.store_cursor(self.cursor_ms).await {
                Ok(()) => self.stored_cursor_ms = self.cursor_ms,
                Err(e) => error!("Failed to store cursor {}: {}", self.cursor_ms, e),
            }
        }

        debug!(
            "Processed {} frames, {} observations, cursor at {}",
            frames.len(),
            observations.len(),
            self.cursor_ms
        );
        Ok(observations)
    }
}
