//! DHT22 (AM2302) single-wire bus driver.
//!
//! Generic over `embedded-hal` pins and delays so the same code drives the
//! sensor from any HAL that exposes an open-drain GPIO.
//!
//! # Protocol
//!
//! 1. Host pulls the line low for at least 1 ms, then releases it.
//! 2. Sensor answers with ~80 µs low followed by ~80 µs high.
//! 3. Sensor sends 40 bits. Each bit is ~50 µs low followed by a high pulse
//!    of ~26 µs (0) or ~70 µs (1).
//! 4. Bytes are humidity (2), temperature (2, sign in the top bit) and a
//!    checksum over the first four.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use thiserror::Error;
use tracing::debug;

use crate::model::RawReading;
use crate::sensor::HygroThermometer;

const FRAME_LEN: usize = 5;

/// Errors that can occur while talking to a DHT22.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Dht22Error {
    /// The sensor did not toggle the line within the expected window.
    #[error("timed out waiting for the sensor")]
    Timeout,

    /// The received frame failed checksum validation.
    #[error("checksum mismatch")]
    Checksum,

    /// The GPIO reported an error.
    #[error("GPIO error")]
    Pin,
}

/// A decoded DHT22 measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dht22Frame {
    pub humidity: f32,
    pub temperature_c: f32,
}

/// Decode the five raw bytes of a DHT22 transmission.
pub fn decode_frame(data: [u8; FRAME_LEN]) -> Result<Dht22Frame, Dht22Error> {
    let checksum = data[0]
        .wrapping_add(data[1])
        .wrapping_add(data[2])
        .wrapping_add(data[3]);
    if checksum != data[4] {
        return Err(Dht22Error::Checksum);
    }

    let humidity = u16::from_be_bytes([data[0], data[1]]) as f32 / 10.0;

    let mut temperature_c = u16::from_be_bytes([data[2] & 0x7F, data[3]]) as f32 / 10.0;
    if data[2] & 0x80 != 0 {
        temperature_c = -temperature_c;
    }

    Ok(Dht22Frame {
        humidity,
        temperature_c,
    })
}

/// DHT22 driver over an open-drain pin.
pub struct Dht22<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Create a driver. The pin must be configured open-drain with a pull-up.
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Perform one bus transaction.
    pub fn read_frame(&mut self) -> Result<Dht22Frame, Dht22Error> {
        let mut data = [0u8; FRAME_LEN];

        // Wake-up: hold low, then release and give the sensor time to respond
        self.pin.set_low().map_err(|_| Dht22Error::Pin)?;
        self.delay.delay_us(3000);
        self.pin.set_high().map_err(|_| Dht22Error::Pin)?;
        self.delay.delay_us(25);

        // Response: 80 µs low, 80 µs high
        self.wait_while(false, 85)?;
        self.wait_while(true, 85)?;

        for bit in 0..FRAME_LEN * 8 {
            self.wait_while(false, 56)?;
            let high_us = self.wait_while(true, 75)?;
            if high_us > 40 {
                data[bit / 8] |= 1 << (7 - bit % 8);
            }
        }

        decode_frame(data)
    }

    /// Busy-wait while the line is at `level`, returning the elapsed microseconds.
    fn wait_while(&mut self, level: bool, max_us: u32) -> Result<u32, Dht22Error> {
        let mut elapsed = 0;
        while self.pin.is_high().map_err(|_| Dht22Error::Pin)? == level {
            elapsed += 1;
            if elapsed > max_us {
                return Err(Dht22Error::Timeout);
            }
            self.delay.delay_us(1);
        }
        Ok(elapsed)
    }

    /// Release the pin and delay.
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P, D> HygroThermometer for Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read(&mut self) -> RawReading {
        match self.read_frame() {
            Ok(frame) => RawReading::from_celsius(frame.humidity, frame.temperature_c),
            Err(e) => {
                debug!("DHT22 transaction failed: {}", e);
                RawReading::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_positive() {
        // 65.2 %RH, 35.1 °C
        let frame = decode_frame([0x02, 0x8C, 0x01, 0x5F, 0xEE]).unwrap();
        assert_eq!(frame.humidity, 65.2);
        assert_eq!(frame.temperature_c, 35.1);
    }

    #[test]
    fn test_decode_negative_temperature() {
        // 65.2 %RH, -10.1 °C
        let frame = decode_frame([0x02, 0x8C, 0x80, 0x65, 0x73]).unwrap();
        assert_eq!(frame.temperature_c, -10.1);
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        assert_eq!(
            decode_frame([0x02, 0x8C, 0x01, 0x5F, 0xEF]),
            Err(Dht22Error::Checksum)
        );
    }
}
