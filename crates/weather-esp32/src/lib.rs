//! ESP32-specific components for the weather station.
//!
//! This crate provides the device glue around `weather-core`:
//! - WiFi association (blocking, retried until it succeeds)
//! - Compile-time network credentials
//! - Registration of the station route table on the esp-idf HTTP server
//!
//! # Example
//!
//! ```ignore
//! use weather_esp32::{config::WifiConfig, http::start_http_server, wifi::connect_wifi};
//!
//! let wifi_config = WifiConfig::from_build_env();
//! let (_wifi, ip) = connect_wifi(&wifi_config.ssid, &wifi_config.password, modem, sysloop)?;
//!
//! let _server = start_http_server(&station_config, dispatcher)?;
//! ```

pub mod config;
pub mod http;
pub mod wifi;
