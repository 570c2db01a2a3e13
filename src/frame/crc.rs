//! # CRC16-CCITT Implementation
//!
//! CRC-16 checksum used by the ISS radio frames.
//!
//! **Polynomial**: 0x1021 (x^16 + x^12 + x^5 + 1)
//! **Initial Value**: 0x0000
//!
//! A sensor frame carries six data bytes followed by the big-endian CRC of
//! those bytes, so running the CRC over all eight bytes yields zero for an
//! intact frame.

use super::protocol::{RawFrame, CRC_COVERED_BYTES, CRC_FIRST_TOKEN, CRC_LAST_TOKEN};

/// CRC-16-CCITT polynomial
const CRC16_POLY: u16 = 0x1021;

/// CRC preset value
const CRC16_PRESET: u16 = 0x0000;

/// Generate the CRC16 lookup table
const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc: u16 = 0;
        let mut c: u16 = (i as u16) << 8;
        let mut j = 0;

        while j < 8 {
            if ((crc ^ c) & 0x8000) != 0 {
                crc = (crc << 1) ^ CRC16_POLY;
            } else {
                crc <<= 1;
            }
            c <<= 1;
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Table-driven CRC16-CCITT engine.
///
/// The table is built once when the engine is constructed and is read-only
/// afterwards; one instance is owned by each packet assembler.
#[derive(Clone)]
pub struct Crc16 {
    table: [u16; 256],
}

impl std::fmt::Debug for Crc16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crc16")
            .field("poly", &format_args!("0x{:04X}", CRC16_POLY))
            .finish_non_exhaustive()
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc16 {
    /// Build the lookup table
    pub const fn new() -> Self {
        Self {
            table: generate_crc16_table(),
        }
    }

    /// Fold one byte into a running CRC
    #[inline]
    fn update(&self, crc: u16, byte: u8) -> u16 {
        let index = ((crc >> 8) ^ byte as u16) & 0xFF;
        (crc << 8) ^ self.table[index as usize]
    }

    /// Calculate CRC16 over a byte slice
    ///
    /// # Examples
    ///
    /// ```
    /// use iss_bridge::frame::crc::Crc16;
    ///
    /// let crc = Crc16::new();
    /// assert_eq!(crc.checksum(b"123456789"), 0x31C3);
    /// ```
    pub fn checksum(&self, data: &[u8]) -> u16 {
        data.iter()
            .fold(CRC16_PRESET, |crc, &byte| self.update(crc, byte))
    }

    /// Check a sensor frame.
    ///
    /// Folds the CRC over the hex bytes at tokens 2 through 9. A short frame
    /// or a non-hex token makes the frame invalid; it is never an error.
    pub fn validate(&self, frame: &RawFrame) -> bool {
        let mut bytes = [0u8; CRC_COVERED_BYTES];

        for (slot, index) in bytes.iter_mut().zip(CRC_FIRST_TOKEN..=CRC_LAST_TOKEN) {
            match frame.hex_byte(index) {
                Ok(byte) => *slot = byte,
                Err(_) => return false,
            }
        }

        self.checksum(&bytes) == 0
    }
}

/// Calculate CRC16 using the bitwise algorithm (slow, for verification)
#[allow(dead_code)]
fn crc16_slow(data: &[u8]) -> u16 {
    let mut crc: u16 = CRC16_PRESET;

    for &byte in data {
        crc ^= (byte as u16) << 8;

        for _ in 0..8 {
            if (crc & 0x8000) != 0 {
                crc = (crc << 1) ^ CRC16_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor_frame(bytes: &[u8]) -> RawFrame {
        let mut tokens = vec!["I".to_string(), "100".to_string()];
        tokens.extend(bytes.iter().map(|b| format!("{:02X}", b)));
        tokens.push("-54".to_string());
        RawFrame::from_tokens(tokens)
    }

    #[test]
    fn test_crc16_empty() {
        assert_eq!(Crc16::new().checksum(&[]), 0x0000);
    }

    #[test]
    fn test_crc16_known_vector() {
        // CRC-16/XMODEM check value
        assert_eq!(Crc16::new().checksum(b"123456789"), 0x31C3);
        assert_eq!(crc16_slow(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_crc16_table_entries() {
        let crc = Crc16::new();
        assert_eq!(crc.table[0], 0x0000);
        assert_eq!(crc.table[1], 0x1021);
        assert_eq!(crc.table[255], 0x1EF0);
    }

    #[test]
    fn test_crc16_lookup_table_matches_slow() {
        let crc = Crc16::new();
        let test_data = [
            vec![0x01, 0x02, 0x03],
            vec![0xFF, 0xFE, 0xFD],
            vec![0xE0, 0x00, 0x85, 0x1D, 0x70, 0x03],
            vec![0x00; 24],
            vec![0xFF; 10],
        ];

        for data in test_data.iter() {
            assert_eq!(
                crc.checksum(data),
                crc16_slow(data),
                "CRC mismatch for data: {:?}",
                data
            );
        }
    }

    #[test]
    fn test_validate_accepts_appended_crc() {
        let crc = Crc16::new();
        let data = [0x80, 0x04, 0x70, 0x0A, 0x41, 0x09];
        let check = crc.checksum(&data);

        let mut bytes = data.to_vec();
        bytes.extend_from_slice(&check.to_be_bytes());

        assert!(crc.validate(&sensor_frame(&bytes)));
    }

    #[test]
    fn test_validate_rejects_any_single_bit_flip() {
        let crc = Crc16::new();
        let data = [0xE0, 0x03, 0x85, 0x1D, 0x70, 0x03];
        let mut bytes = data.to_vec();
        bytes.extend_from_slice(&crc.checksum(&data).to_be_bytes());

        for byte in 0..bytes.len() {
            for bit in 0..8 {
                let mut corrupted = bytes.clone();
                corrupted[byte] ^= 1 << bit;
                assert!(
                    !crc.validate(&sensor_frame(&corrupted)),
                    "flip of bit {} in byte {} went undetected",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn test_validate_short_frame_is_invalid() {
        let crc = Crc16::new();
        // All-zero bytes would checksum to zero; too few tokens must still fail
        assert!(!crc.validate(&RawFrame::parse("I 100 00 00 00 00 00 00 00")));
    }

    #[test]
    fn test_validate_non_hex_token_is_invalid() {
        let crc = Crc16::new();
        assert!(!crc.validate(&RawFrame::parse("I 100 00 00 zz 00 00 00 00 00")));
        assert!(crc.validate(&RawFrame::parse("I 100 00 00 00 00 00 00 00 00")));
    }
}
