//! # Receiver Frame Encoder
//!
//! Builds receiver lines in the format the decoder accepts. Used to produce
//! replay fixtures and test streams.

use super::crc::Crc16;
use super::protocol::*;

/// Station id written at token 1 of encoded sensor frames
pub const DEFAULT_STATION_TOKEN: &str = "100";

/// Signal strength written after the CRC of encoded sensor frames
pub const DEFAULT_RSSI_TOKEN: &str = "-54";

/// Encode six data bytes into a sensor frame with a valid CRC16
///
/// # Arguments
///
/// * `payload` - Channel byte, wind speed, wind direction and three payload bytes
///
/// # Returns
///
/// * `RawFrame` - `I` frame with the big-endian CRC at tokens 8 and 9
///
/// # Examples
///
/// ```
/// use iss_bridge::frame::crc::Crc16;
/// use iss_bridge::frame::encoder::encode_sensor_frame;
///
/// let frame = encode_sensor_frame([0x80, 0x05, 0x40, 0x2A, 0x80, 0x00]);
/// assert!(Crc16::new().validate(&frame));
/// ```
pub fn encode_sensor_frame(payload: [u8; 6]) -> RawFrame {
    let crc = Crc16::new().checksum(&payload);

    let mut tokens = Vec::with_capacity(SENSOR_FRAME_MIN_TOKENS + 1);
    tokens.push(FRAME_TAG_SENSOR.to_string());
    tokens.push(DEFAULT_STATION_TOKEN.to_string());
    tokens.extend(payload.iter().map(|b| format!("{:02X}", b)));
    tokens.extend(crc.to_be_bytes().iter().map(|b| format!("{:02X}", b)));
    tokens.push(DEFAULT_RSSI_TOKEN.to_string());

    RawFrame::from_tokens(tokens)
}

/// Encode a barometer frame
///
/// # Arguments
///
/// * `kind` - [`FrameType::DirectBarometer`] or [`FrameType::StationBarometer`]
/// * `hundredths_hpa` - Pressure in hundredths of hPa
pub fn encode_barometer_frame(kind: FrameType, hundredths_hpa: u32) -> RawFrame {
    let mut tokens = vec![kind.tag().to_string()];
    tokens.resize(PRESSURE_TOKEN, "0".to_string());
    tokens.push(hundredths_hpa.to_string());

    RawFrame::from_tokens(tokens)
}
