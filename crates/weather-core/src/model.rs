//! Reading types.
//!
//! A [`RawReading`] is what a sensor driver hands back from one bus
//! transaction. A [`SensorSample`] is the validated, fully derived reading
//! that the rest of the station publishes.

use serde::{Deserialize, Serialize};

/// Convert degrees Celsius to degrees Fahrenheit.
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

/// Convert degrees Fahrenheit to degrees Celsius.
pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 0.555_555_6
}

/// Raw channels reported by a humidity/temperature driver.
///
/// Drivers signal a bad read (checksum failure, timing violation,
/// disconnected sensor) by reporting NaN on the affected channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
    /// Relative humidity in percent.
    pub humidity: f32,
    /// Temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Temperature in degrees Fahrenheit.
    pub temperature_f: f32,
}

impl RawReading {
    /// Build a reading from a Celsius measurement, deriving the Fahrenheit channel.
    pub fn from_celsius(humidity: f32, temperature_c: f32) -> Self {
        Self {
            humidity,
            temperature_c,
            temperature_f: celsius_to_fahrenheit(temperature_c),
        }
    }

    /// A reading where every channel reports failure.
    pub fn failed() -> Self {
        Self {
            humidity: f32::NAN,
            temperature_c: f32::NAN,
            temperature_f: f32::NAN,
        }
    }
}

/// One complete, validated sensor sample.
///
/// Every field is finite. Samples that would violate this are never built;
/// see [`crate::SensorReader::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Temperature in degrees Fahrenheit.
    pub temperature_f: f32,
    /// Temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Relative humidity in percent, 0 to 100.
    pub humidity_pct: f32,
    /// Heat index in degrees Fahrenheit.
    pub heat_index_f: f32,
    /// Heat index in degrees Celsius.
    pub heat_index_c: f32,
}

impl SensorSample {
    /// Humidity rounded to the nearest whole percent.
    pub fn humidity_rounded(&self) -> i32 {
        self.humidity_pct.round() as i32
    }

    /// Check that every field is a finite number.
    pub fn is_finite(&self) -> bool {
        [
            self.temperature_f,
            self.temperature_c,
            self.humidity_pct,
            self.heat_index_f,
            self.heat_index_c,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
