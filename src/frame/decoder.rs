//! # Receiver Frame Decoder
//!
//! Decodes the physical quantities carried by receiver frames. Each decoder
//! reads fixed token positions and fails with
//! [`IssBridgeError::MalformedFrame`] when a field is missing or unparseable.

use super::protocol::*;
use crate::error::{IssBridgeError, Result};

/// Miles per hour to metres per second
pub const MPH_TO_MS: f64 = 0.44704;

/// Largest valid raw wind direction code
pub const WIND_DIRECTION_CODE_MAX: u16 = 1024;

/// Direction reported for a missing or out-of-range direction code
pub const WIND_DIRECTION_NORTH_DEG: f64 = 360.0;

/// Rainfall per bucket tip in millimetres
pub const RAIN_MM_PER_TIP: f64 = 0.2001;

/// Rain tip counter width mask (7 bits)
pub const RAIN_TICKS_MASK: u8 = 0x7F;

/// Humidity scale factor applied to the raw tenths value
pub const HUMIDITY_SCALE: f64 = 1.01 / 10.0;

/// Upper bound of relative humidity in percent
pub const HUMIDITY_MAX: f64 = 100.0;

/// One wind reading from a sensor frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSample {
    /// Speed in m/s
    pub speed: f64,

    /// Direction the wind blows from, degrees clockwise from north (0, 360]
    pub direction: f64,
}

/// How the pressure in a barometer frame is referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureKind {
    /// Already reduced to sea level
    SeaLevel,
    /// Station pressure at the receiver's height
    Station,
}

/// One pressure reading from a barometer frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureReading {
    /// Reference level of `hpa`
    pub kind: PressureKind,

    /// Pressure in hPa
    pub hpa: f64,
}

/// Decode the wind sample every sensor frame carries
///
/// Speed is one byte in mph. The direction code combines the direction byte
/// (shifted left by two) with bit 1 of the second payload byte and is scaled
/// linearly from 0..1024 to 0..360 degrees; a zero or out-of-range code is
/// reported as 360 degrees.
pub fn decode_wind(frame: &RawFrame) -> Result<WindSample> {
    let speed = frame.hex_byte(WIND_SPEED_TOKEN)? as f64 * MPH_TO_MS;

    let code = ((frame.hex_byte(WIND_DIRECTION_TOKEN)? as u16) << 2)
        | (frame.hex_byte(PAYLOAD_LO_TOKEN)? as u16 & 0x02);

    let direction = if code == 0 || code > WIND_DIRECTION_CODE_MAX {
        WIND_DIRECTION_NORTH_DEG
    } else {
        code as f64 * 360.0 / WIND_DIRECTION_CODE_MAX as f64
    };

    Ok(WindSample { speed, direction })
}

/// Decode the gust speed of a gust channel frame in m/s
pub fn decode_gust(frame: &RawFrame) -> Result<f64> {
    Ok(frame.hex_byte(PAYLOAD_HI_TOKEN)? as f64 * MPH_TO_MS)
}

/// Decode the outside temperature of a temperature channel frame in °C
///
/// The payload is a big-endian signed 16-bit value in 1/160 °F.
pub fn decode_temperature(frame: &RawFrame) -> Result<f64> {
    let raw = i16::from_be_bytes([
        frame.hex_byte(PAYLOAD_HI_TOKEN)?,
        frame.hex_byte(PAYLOAD_LO_TOKEN)?,
    ]);

    Ok((raw as f64 / 160.0 - 32.0) * 5.0 / 9.0)
}

/// Decode the outside humidity of a humidity channel frame in percent
///
/// The 12-bit raw value takes its high nibble from the top of the second
/// payload byte and its low byte from the first; the result is capped at 100.
pub fn decode_humidity(frame: &RawFrame) -> Result<f64> {
    let high = (frame.hex_byte(PAYLOAD_LO_TOKEN)? >> 4) as u16;
    let low = frame.hex_byte(PAYLOAD_HI_TOKEN)? as u16;
    let raw = (high << 8) | low;

    Ok((raw as f64 * HUMIDITY_SCALE).min(HUMIDITY_MAX))
}

/// Decode the 7-bit rain tip counter of a rain channel frame
pub fn decode_rain_ticks(frame: &RawFrame) -> Result<u8> {
    Ok(frame.hex_byte(PAYLOAD_HI_TOKEN)? & RAIN_TICKS_MASK)
}

/// Decode the pressure of a barometer frame
///
/// # Errors
///
/// Returns error if the frame is not barometer-class or the pressure field
/// is missing or not a finite decimal number.
pub fn decode_pressure(frame: &RawFrame) -> Result<PressureReading> {
    let kind = match frame.frame_type()? {
        FrameType::DirectBarometer => PressureKind::SeaLevel,
        FrameType::StationBarometer => PressureKind::Station,
        FrameType::Sensor => {
            return Err(IssBridgeError::MalformedFrame(
                "sensor frame carries no pressure".to_string(),
            ))
        }
    };

    let token = frame.token(PRESSURE_TOKEN)?;
    let hundredths: f64 = token.parse().map_err(|_| {
        IssBridgeError::MalformedFrame(format!("pressure field is not a number: {:?}", token))
    })?;

    if !hundredths.is_finite() {
        return Err(IssBridgeError::MalformedFrame(format!(
            "pressure field is not finite: {:?}",
            token
        )));
    }

    Ok(PressureReading {
        kind,
        hpa: hundredths / 100.0,
    })
}
