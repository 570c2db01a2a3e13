//! # Receiver Frame Module
//!
//! Handling of the raw text frames emitted by the ISS receiver.
//!
//! This module handles:
//! - Tokenizing receiver lines into [`protocol::RawFrame`] values
//! - CRC16-CCITT validation of sensor frames
//! - Channel classification and per-channel physical decoding
//! - Building well-formed frames for replay and tests

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod crc;
