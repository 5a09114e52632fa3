//! Device configuration.
//!
//! The device has no configuration storage: network credentials are baked in
//! at build time from the `WIFI_SSID` and `WIFI_PASS` environment variables,
//! and the station runs on default settings.

use serde::{Deserialize, Serialize};
use weather_core::StationConfig;

/// SSID compiled into the firmware.
pub const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};

/// Password compiled into the firmware.
pub const WIFI_PASS: &str = match option_env!("WIFI_PASS") {
    Some(pass) => pass,
    None => "",
};

/// WiFi configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WifiConfig {
    /// WiFi network SSID.
    pub ssid: String,

    /// WiFi network password (empty for open networks).
    pub password: String,
}

impl WifiConfig {
    /// Credentials compiled into the firmware.
    pub fn from_build_env() -> Self {
        Self {
            ssid: WIFI_SSID.to_string(),
            password: WIFI_PASS.to_string(),
        }
    }
}

/// Station settings for the device build.
pub fn station_config() -> StationConfig {
    StationConfig {
        name: "weather-station-esp32".to_string(),
        ..Default::default()
    }
}
