//! Heat index ("feels like" temperature).
//!
//! Uses the NOAA approximation: Steadman's simple average for mild
//! conditions, switching to the Rothfusz regression with its low and high
//! humidity adjustments once the simple result exceeds 79 °F.

use crate::model::{celsius_to_fahrenheit, fahrenheit_to_celsius};

/// Heat index in °F from a temperature in °F and relative humidity in percent.
pub fn heat_index_f(temperature_f: f32, humidity: f32) -> f32 {
    let t = temperature_f;
    let rh = humidity;

    let simple = 0.5 * (t + 61.0 + ((t - 68.0) * 1.2) + (rh * 0.094));
    if simple <= 79.0 {
        return simple;
    }

    let mut hi = rothfusz(t, rh);

    if rh < 13.0 && (80.0..=112.0).contains(&t) {
        hi -= ((13.0 - rh) * 0.25) * ((17.0 - (t - 95.0).abs()) * 0.058_82).sqrt();
    } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
        hi += ((rh - 85.0) * 0.1) * ((87.0 - t) * 0.2);
    }

    hi
}

/// Heat index in °C from a temperature in °C and relative humidity in percent.
pub fn heat_index_c(temperature_c: f32, humidity: f32) -> f32 {
    fahrenheit_to_celsius(heat_index_f(celsius_to_fahrenheit(temperature_c), humidity))
}

fn rothfusz(t: f32, rh: f32) -> f32 {
    -42.379 + 2.049_015_2 * t + 10.143_331 * rh
        - 0.224_755_41 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh
}
