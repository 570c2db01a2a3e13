//! # Receiver Frame Constants and Types
//!
//! A receiver line is a run of whitespace-separated ASCII tokens. Token 0 is
//! a single-character type tag; sensor frames (`I`) carry eight hex-encoded
//! bytes at positions 2 through 9 (six data bytes followed by the CRC16),
//! barometer frames (`A`/`B`) carry the pressure in hundredths of hPa at
//! position 4.
//!
//! ```text
//! I  <id> <b0> <b1> <b2> <b3> <b4> <b5> <crc_hi> <crc_lo> [rssi ...]
//! B  <...> <...> <...> <pressure x100> [...]
//! ```

use crate::error::{IssBridgeError, Result};

/// Type tag of a barometer frame with pressure already reduced to sea level
pub const FRAME_TAG_DIRECT_BAROMETER: &str = "A";

/// Type tag of a barometer frame carrying raw station pressure
pub const FRAME_TAG_STATION_BAROMETER: &str = "B";

/// Type tag of an ISS sensor frame
pub const FRAME_TAG_SENSOR: &str = "I";

/// Minimum number of tokens for a decodable sensor frame
pub const SENSOR_FRAME_MIN_TOKENS: usize = 10;

/// Token positions covered by the CRC16 (inclusive range)
pub const CRC_FIRST_TOKEN: usize = 2;
pub const CRC_LAST_TOKEN: usize = 9;

/// Number of bytes covered by the CRC16 (6 data bytes + 2 CRC bytes)
pub const CRC_COVERED_BYTES: usize = CRC_LAST_TOKEN - CRC_FIRST_TOKEN + 1;

/// Channel token; its first character identifies the sensor
pub const CHANNEL_TOKEN: usize = 2;

/// Wind speed byte (mph)
pub const WIND_SPEED_TOKEN: usize = 3;

/// Wind direction high bits
pub const WIND_DIRECTION_TOKEN: usize = 4;

/// Channel payload, first byte (rain ticks, gust speed, temperature MSB, humidity LSB)
pub const PAYLOAD_HI_TOKEN: usize = 5;

/// Channel payload, second byte (temperature LSB, humidity high nibble, wind direction low bits)
pub const PAYLOAD_LO_TOKEN: usize = 6;

/// Barometer frame pressure field (hundredths of hPa, decimal)
pub const PRESSURE_TOKEN: usize = 4;

/// Kind of report, derived from the type tag at token 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// `A`: pressure already reduced to sea level
    DirectBarometer,
    /// `B`: station pressure, projected to sea level by the estimator
    StationBarometer,
    /// `I`: CRC-protected ISS sensor frame
    Sensor,
}

impl FrameType {
    /// Map a type tag to a frame type
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            FRAME_TAG_DIRECT_BAROMETER => Some(FrameType::DirectBarometer),
            FRAME_TAG_STATION_BAROMETER => Some(FrameType::StationBarometer),
            FRAME_TAG_SENSOR => Some(FrameType::Sensor),
            _ => None,
        }
    }

    /// Type tag written at token 0
    pub fn tag(self) -> &'static str {
        match self {
            FrameType::DirectBarometer => FRAME_TAG_DIRECT_BAROMETER,
            FrameType::StationBarometer => FRAME_TAG_STATION_BAROMETER,
            FrameType::Sensor => FRAME_TAG_SENSOR,
        }
    }

    /// Barometer-class frames close minute buckets
    pub fn is_barometer(self) -> bool {
        matches!(self, FrameType::DirectBarometer | FrameType::StationBarometer)
    }
}

/// Sensor carried by a frame's channel payload.
///
/// Wind is not a channel: every valid sensor frame carries a wind sample in
/// addition to the payload identified here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Rain bucket tip counter (`E`)
    Rain,
    /// Outside temperature (`8`)
    Temperature,
    /// Wind gust speed (`9`)
    Gust,
    /// Outside humidity (`A`)
    Humidity,
    /// Channels the station reports but that are not aggregated
    /// (`2` supercap voltage, `5` rain rate, `7` solar, anything else)
    Other(char),
}

impl SensorKind {
    /// Map a channel nibble character to a sensor kind
    pub fn from_channel(ch: char) -> Self {
        match ch.to_ascii_uppercase() {
            '8' => SensorKind::Temperature,
            '9' => SensorKind::Gust,
            'A' => SensorKind::Humidity,
            'E' => SensorKind::Rain,
            other => SensorKind::Other(other),
        }
    }

    /// Human-readable channel name for logs
    pub fn name(self) -> &'static str {
        match self {
            SensorKind::Rain => "rain",
            SensorKind::Temperature => "temperature",
            SensorKind::Gust => "gust",
            SensorKind::Humidity => "humidity",
            SensorKind::Other('2') => "supercap voltage",
            SensorKind::Other('5') => "rain rate",
            SensorKind::Other('7') => "solar",
            SensorKind::Other(_) => "unknown",
        }
    }

    /// Whether this channel feeds one of the aggregated estimators
    pub fn is_routed(self) -> bool {
        !matches!(self, SensorKind::Other(_))
    }
}

/// One tokenized receiver line.
///
/// All field access is bounds- and format-checked and fails with
/// [`IssBridgeError::MalformedFrame`] instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    tokens: Vec<String>,
}

impl RawFrame {
    /// Tokenize a receiver line on ASCII whitespace
    ///
    /// # Examples
    ///
    /// ```
    /// use iss_bridge::frame::protocol::RawFrame;
    ///
    /// let frame = RawFrame::parse("B 0 0 0 101325");
    /// assert_eq!(frame.len(), 5);
    /// assert_eq!(frame.token(4).unwrap(), "101325");
    /// ```
    pub fn parse(line: &str) -> Self {
        Self {
            tokens: line.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Build a frame from already split tokens
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True for an empty line
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at a fixed position
    pub fn token(&self, index: usize) -> Result<&str> {
        self.tokens
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| {
                IssBridgeError::MalformedFrame(format!(
                    "missing token {} (frame has {})",
                    index,
                    self.tokens.len()
                ))
            })
    }

    /// Token at a fixed position parsed as one hex-encoded byte
    pub fn hex_byte(&self, index: usize) -> Result<u8> {
        let token = self.token(index)?;
        u8::from_str_radix(token, 16).map_err(|_| {
            IssBridgeError::MalformedFrame(format!(
                "token {} is not a hex byte: {:?}",
                index, token
            ))
        })
    }

    /// Frame type from the tag at token 0
    pub fn frame_type(&self) -> Result<FrameType> {
        let tag = self.token(0)?;
        FrameType::from_tag(tag)
            .ok_or_else(|| IssBridgeError::MalformedFrame(format!("unknown frame type {:?}", tag)))
    }

    /// Re-join the tokens into a receiver line
    pub fn to_line(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Classify a sensor frame by the first character of its channel token.
///
/// Returns `None` when the frame is shorter than [`SENSOR_FRAME_MIN_TOKENS`]
/// or the channel token is empty.
pub fn classify(frame: &RawFrame) -> Option<SensorKind> {
    if frame.len() < SENSOR_FRAME_MIN_TOKENS {
        return None;
    }

    let ch = frame.token(CHANNEL_TOKEN).ok()?.chars().next()?;
    Some(SensorKind::from_channel(ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(SENSOR_FRAME_MIN_TOKENS, 10);
        assert_eq!(CRC_COVERED_BYTES, 8);
        assert_eq!(CHANNEL_TOKEN, CRC_FIRST_TOKEN);
    }

    #[test]
    fn test_parse_splits_on_whitespace() {
        let frame = RawFrame::parse("  I 100\tE0 0 85  1D 70 03 59 36 -54 ");
        assert_eq!(frame.len(), 11);
        assert_eq!(frame.token(0).unwrap(), "I");
        assert_eq!(frame.token(10).unwrap(), "-54");
        assert_eq!(frame.to_line(), "I 100 E0 0 85 1D 70 03 59 36 -54");
    }

    #[test]
    fn test_token_out_of_range_is_malformed() {
        let frame = RawFrame::parse("I 100");
        match frame.token(5) {
            Err(IssBridgeError::MalformedFrame(msg)) => assert!(msg.contains("missing token 5")),
            other => panic!("Expected MalformedFrame, got: {:?}", other),
        }
    }

    #[test]
    fn test_hex_byte() {
        let frame = RawFrame::parse("I 1 E0 0 ff zz");
        assert_eq!(frame.hex_byte(2).unwrap(), 0xE0);
        assert_eq!(frame.hex_byte(3).unwrap(), 0x00);
        assert_eq!(frame.hex_byte(4).unwrap(), 0xFF);
        assert!(frame.hex_byte(5).is_err());
        assert!(frame.hex_byte(6).is_err());
    }

    #[test]
    fn test_hex_byte_rejects_wide_values() {
        let frame = RawFrame::parse("I 1 1FF");
        assert!(frame.hex_byte(2).is_err());
    }

    #[test]
    fn test_frame_type() {
        assert_eq!(RawFrame::parse("A 1").frame_type().unwrap(), FrameType::DirectBarometer);
        assert_eq!(RawFrame::parse("B 1").frame_type().unwrap(), FrameType::StationBarometer);
        assert_eq!(RawFrame::parse("I 1").frame_type().unwrap(), FrameType::Sensor);
        assert!(RawFrame::parse("X 1").frame_type().is_err());
        assert!(RawFrame::parse("").frame_type().is_err());
    }

    #[test]
    fn test_frame_type_tag_round_trip() {
        for kind in [FrameType::DirectBarometer, FrameType::StationBarometer, FrameType::Sensor] {
            assert_eq!(FrameType::from_tag(kind.tag()), Some(kind));
        }
        assert!(FrameType::DirectBarometer.is_barometer());
        assert!(FrameType::StationBarometer.is_barometer());
        assert!(!FrameType::Sensor.is_barometer());
    }

    #[test]
    fn test_classify_channels() {
        let kind = |ch: &str| classify(&RawFrame::parse(&format!("I 1 {} 0 0 0 0 0 0 0", ch)));

        assert_eq!(kind("E0"), Some(SensorKind::Rain));
        assert_eq!(kind("e1"), Some(SensorKind::Rain));
        assert_eq!(kind("80"), Some(SensorKind::Temperature));
        assert_eq!(kind("90"), Some(SensorKind::Gust));
        assert_eq!(kind("A0"), Some(SensorKind::Humidity));
        assert_eq!(kind("20"), Some(SensorKind::Other('2')));
        assert_eq!(kind("50"), Some(SensorKind::Other('5')));
        assert_eq!(kind("F0"), Some(SensorKind::Other('F')));
    }

    #[test]
    fn test_classify_short_frame() {
        assert_eq!(classify(&RawFrame::parse("I 1 E0 0 0 0 0 0 0")), None);
        assert_eq!(classify(&RawFrame::parse("")), None);
    }

    #[test]
    fn test_sensor_kind_routing() {
        assert!(SensorKind::Rain.is_routed());
        assert!(SensorKind::Temperature.is_routed());
        assert!(SensorKind::Gust.is_routed());
        assert!(SensorKind::Humidity.is_routed());
        assert!(!SensorKind::Other('7').is_routed());
        assert_eq!(SensorKind::Other('7').name(), "solar");
        assert_eq!(SensorKind::Other('C').name(), "unknown");
    }
}
