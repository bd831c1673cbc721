//! Conversion between raw 10-bit values and volts
//!
//! Both the ADC inputs and the DAC output share one linear scale:
//! `0` is 0 V and [`MAX_RAW`] is [`FULL_SCALE_VOLTS`].

/// Largest raw value on any channel
pub const MAX_RAW: u16 = 1023;

/// Voltage corresponding to [`MAX_RAW`]
pub const FULL_SCALE_VOLTS: f64 = 3.3;

/// Convert a raw reading or setting to volts
pub fn raw_to_volt(raw: u16) -> f64 {
    f64::from(raw) * (FULL_SCALE_VOLTS / f64::from(MAX_RAW))
}

/// Convert volts to the nearest raw value
///
/// The result is not clamped; callers validate it against `0..=MAX_RAW`.
pub fn volt_to_raw(volt: f64) -> i32 {
    (volt * f64::from(MAX_RAW) / FULL_SCALE_VOLTS).round() as i32
}
