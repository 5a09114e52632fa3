//! WiFi connection utilities for ESP32.
//!
//! Association is the station's only startup precondition: the HTTP server
//! is not started until the device has an IP address.

use anyhow::{anyhow, bail, Result};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{delay::FreeRtos, peripheral},
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::{info, warn};

/// Delay between association attempts.
pub const RETRY_DELAY_MS: u32 = 500;

/// Connect to a WiFi network, retrying until it succeeds.
///
/// This function handles the full WiFi connection process:
/// 1. Scans for available networks
/// 2. Finds the target network and its channel
/// 3. Connects with the provided credentials, retrying every [`RETRY_DELAY_MS`]
/// 4. Waits for DHCP lease
///
/// # Arguments
///
/// * `ssid` - Network name (cannot be empty)
/// * `password` - Network password (empty for open networks)
/// * `modem` - ESP32 modem peripheral
/// * `sysloop` - ESP system event loop
///
/// # Returns
///
/// Returns a boxed `EspWifi` instance that must be kept alive for the connection
/// to remain active, and the assigned IP address.
pub fn connect_wifi(
    ssid: &str,
    password: &str,
    modem: impl peripheral::Peripheral<P = esp_idf_svc::hal::modem::Modem> + 'static,
    sysloop: EspSystemEventLoop,
) -> Result<(Box<EspWifi<'static>>, String)> {
    if ssid.is_empty() {
        bail!("WiFi SSID cannot be empty (set WIFI_SSID at build time)");
    }

    let auth_method = if password.is_empty() {
        info!("WiFi password is empty, using open network");
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };

    let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), None)?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sysloop)?;

    // Initial configuration for scanning
    wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
    wifi.start()?;

    info!("Scanning for WiFi networks...");
    let channel = wifi
        .scan()?
        .into_iter()
        .find(|ap| ap.ssid == ssid)
        .map(|ap| {
            info!("Found '{}' on channel {}", ssid, ap.channel);
            ap.channel
        });

    if channel.is_none() {
        info!("Network '{}' not found in scan, will try anyway", ssid);
    }

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: ssid
            .try_into()
            .map_err(|_| anyhow!("SSID too long (max 32 chars)"))?,
        password: password
            .try_into()
            .map_err(|_| anyhow!("Password too long (max 64 chars)"))?,
        channel,
        auth_method,
        ..Default::default()
    }))?;

    info!("Working to connect to '{}'", ssid);
    let mut attempts: u32 = 0;
    while let Err(e) = wifi.connect() {
        attempts += 1;
        warn!("Connect attempt {} failed: {}", attempts, e);
        FreeRtos::delay_ms(RETRY_DELAY_MS);
    }

    info!("Waiting for DHCP lease...");
    wifi.wait_netif_up()?;

    let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
    info!("Connected to {}", ssid);
    info!("  IP address: {}", ip_info.ip);
    info!("  Gateway:    {}", ip_info.subnet.gateway);
    info!("  Netmask:    {}", ip_info.subnet.mask);

    Ok((Box::new(esp_wifi), ip_info.ip.to_string()))
}
