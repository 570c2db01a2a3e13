//! # ISS Bridge Library
//!
//! Decode Davis Vantage Vue ISS receiver frames into minute weather observations.
//!
//! This library provides the frame codec (CRC16, field decoding), the rolling
//! estimators, and the packet assembler that buckets frames into weewx-style
//! observations, plus the frame store and observation log plumbing around them.

pub mod config;
pub mod error;
pub mod estimator;
pub mod frame;
pub mod runner;
pub mod source;
pub mod station;
pub mod telemetry;
