//! Sensor reader.
//!
//! Wraps a humidity/temperature driver, waits out the sensor's settling
//! delay, validates the raw channels and derives the heat index.

use embedded_hal::delay::DelayNs;
use thiserror::Error;
use tracing::{info, warn};

use crate::heat_index::{heat_index_c, heat_index_f};
use crate::model::{RawReading, SensorSample};

/// Minimum time a DHT22 needs between two reliable samples.
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 2000;

/// A humidity/temperature sensor driver.
pub trait HygroThermometer {
    /// Perform one read. Channels that could not be read are NaN.
    fn read(&mut self) -> RawReading;
}

impl<T: HygroThermometer + ?Sized> HygroThermometer for Box<T> {
    fn read(&mut self) -> RawReading {
        (**self).read()
    }
}

/// Errors that can occur while polling the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorReadError {
    #[error("humidity reading is not a number")]
    Humidity,

    #[error("Celsius temperature reading is not a number")]
    TemperatureCelsius,

    #[error("Fahrenheit temperature reading is not a number")]
    TemperatureFahrenheit,

    #[error("derived heat index is not a finite number")]
    HeatIndex,
}

/// Polls a [`HygroThermometer`] and turns raw readings into [`SensorSample`]s.
pub struct SensorReader<S, D> {
    sensor: S,
    delay: D,
    settle_delay_ms: u32,
}

impl<S: HygroThermometer, D: DelayNs> SensorReader<S, D> {
    /// Create a reader with the default settling delay.
    pub fn new(sensor: S, delay: D) -> Self {
        Self::with_settle_delay(sensor, delay, DEFAULT_SETTLE_DELAY_MS)
    }

    /// Create a reader with a custom settling delay in milliseconds.
    pub fn with_settle_delay(sensor: S, delay: D, settle_delay_ms: u32) -> Self {
        Self {
            sensor,
            delay,
            settle_delay_ms,
        }
    }

    /// Block for the settling delay, then take one sample.
    ///
    /// Returns an error if any raw channel is NaN. Nothing is derived from a
    /// failed read.
    pub fn poll(&mut self) -> Result<SensorSample, SensorReadError> {
        self.delay.delay_ms(self.settle_delay_ms);

        let raw = self.sensor.read();
        match derive_sample(raw) {
            Ok(sample) => {
                info!(
                    "Humidity: {:.2}%  Temperature: {:.2}°C {:.2}°F  Heat index: {:.2}°C {:.2}°F",
                    sample.humidity_pct,
                    sample.temperature_c,
                    sample.temperature_f,
                    sample.heat_index_c,
                    sample.heat_index_f
                );
                Ok(sample)
            }
            Err(e) => {
                warn!("Failed to read from DHT sensor: {}", e);
                Err(e)
            }
        }
    }

    pub fn settle_delay_ms(&self) -> u32 {
        self.settle_delay_ms
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}

/// Validate a raw reading and derive the heat index in both units.
pub fn derive_sample(raw: RawReading) -> Result<SensorSample, SensorReadError> {
    if !raw.humidity.is_finite() {
        return Err(SensorReadError::Humidity);
    }
    if !raw.temperature_c.is_finite() {
        return Err(SensorReadError::TemperatureCelsius);
    }
    if !raw.temperature_f.is_finite() {
        return Err(SensorReadError::TemperatureFahrenheit);
    }

    let sample = SensorSample {
        temperature_f: raw.temperature_f,
        temperature_c: raw.temperature_c,
        humidity_pct: raw.humidity,
        heat_index_f: heat_index_f(raw.temperature_f, raw.humidity),
        heat_index_c: heat_index_c(raw.temperature_c, raw.humidity),
    };

    if sample.is_finite() {
        Ok(sample)
    } else {
        Err(SensorReadError::HeatIndex)
    }
}
