//! Weather station firmware for ESP32.
//!
//! Joins the WiFi network compiled into the image, then answers
//! `GET /`, `GET /temp` and `GET /humidity` on port 80 with readings from a
//! DHT22 on GPIO4.
//!
//! This binary requires the ESP32 Rust toolchain.

use std::sync::{Arc, Mutex};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::{PinDriver, Pull};
use esp_idf_svc::hal::prelude::Peripherals;
use log::info;

use weather_core::dht22::Dht22;
use weather_core::{Dispatcher, StationContext};
use weather_esp32::config::{station_config, WifiConfig};
use weather_esp32::http::start_http_server;
use weather_esp32::wifi::connect_wifi;

fn main() -> anyhow::Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly.
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = station_config();
    config.validate()?;
    info!("Weather station '{}' starting", config.name);

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    // DHT22 data line: open drain with pull-up, idle high
    let mut pin = PinDriver::input_output_od(peripherals.pins.gpio4)?;
    pin.set_pull(Pull::Up)?;
    pin.set_high()?;
    let sensor = Dht22::new(pin, Ets);

    let wifi_config = WifiConfig::from_build_env();
    let (_wifi, ip) = connect_wifi(
        &wifi_config.ssid,
        &wifi_config.password,
        peripherals.modem,
        sysloop,
    )?;

    let dispatcher = Arc::new(Mutex::new(Dispatcher::new(StationContext::new(
        sensor, FreeRtos, &config,
    ))));
    let _server = start_http_server(&config, dispatcher)?;

    info!("Weather station ready at http://{}/", ip);

    // Handlers run on the HTTP server task; keep wifi and server alive
    loop {
        FreeRtos::delay_ms(1000);
    }
}
