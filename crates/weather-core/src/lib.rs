//! # weather-core
//!
//! Core weather station logic.
//!
//! This crate provides:
//! - Reading types (raw driver reading, validated sample)
//! - Heat index computation
//! - The sensor reader and a DHT22 single-wire bus driver
//! - JSON payload codec
//! - Station configuration
//! - The route table and dispatcher shared by every HTTP front end
//!
//! This crate is intentionally runtime-agnostic and contains no async code,
//! making it usable on both Linux (tokio) and ESP32 (esp-idf) targets.

pub mod codec;
pub mod config;
pub mod dht22;
pub mod heat_index;
pub mod model;
pub mod sensor;
pub mod station;

pub use codec::{CodecError, ReadingPayload};
pub use config::{ConfigError, FailurePolicy, StationConfig};
pub use model::*;
pub use sensor::{HygroThermometer, SensorReadError, SensorReader};
pub use station::{Dispatcher, ReadingCache, Response, StationContext};
