//! # Dew Point
//!
//! Magnus formula with the DWD coefficient sets for saturation over water
//! (T >= 0 °C) and over ice (T < 0 °C).

/// Magnus base pressure in hPa
const MAGNUS_C1: f64 = 6.10780;

/// Magnus coefficients at or above 0 °C
const MAGNUS_C2_POS: f64 = 17.08085;
const MAGNUS_C3_POS: f64 = 234.175;

/// Magnus coefficients below 0 °C
const MAGNUS_C2_NEG: f64 = 17.84362;
const MAGNUS_C3_NEG: f64 = 245.425;

/// Magnus coefficients for a temperature
fn coefficients(temperature: f64) -> (f64, f64) {
    if temperature >= 0.0 {
        (MAGNUS_C2_POS, MAGNUS_C3_POS)
    } else {
        (MAGNUS_C2_NEG, MAGNUS_C3_NEG)
    }
}

/// Saturation vapour pressure in hPa
pub fn saturation_vapour_pressure(temperature: f64) -> f64 {
    let (c2, c3) = coefficients(temperature);
    MAGNUS_C1 * (c2 * temperature / (c3 + temperature)).exp()
}

/// Dew point in °C, rounded to one decimal.
///
/// Returns `None` when either input is missing or the humidity is not
/// positive. A positive temperature whose dew point solves below zero is
/// re-solved with the ice coefficients, and the result never exceeds the
/// air temperature.
///
/// # Examples
///
/// ```
/// use iss_bridge::estimator::dewpoint::dew_point;
///
/// assert_eq!(dew_point(Some(20.0), Some(100.0)), Some(20.0));
/// assert_eq!(dew_point(None, Some(50.0)), None);
/// ```
pub fn dew_point(temperature: Option<f64>, humidity: Option<f64>) -> Option<f64> {
    let (temperature, humidity) = (temperature?, humidity?);
    if humidity <= 0.0 {
        return None;
    }

    let (c2, c3) = coefficients(temperature);
    let ln = (0.01 * humidity * saturation_vapour_pressure(temperature) / MAGNUS_C1).ln();

    let mut dew = c3 * ln / (c2 - ln);
    if temperature >= 0.0 && dew < 0.0 {
        dew = MAGNUS_C3_NEG * ln / (MAGNUS_C2_NEG - ln);
    }

    if !dew.is_finite() {
        return None;
    }

    Some((dew.min(temperature) * 10.0).round() / 10.0)
}
