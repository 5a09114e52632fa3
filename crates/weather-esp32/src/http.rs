//! HTTP server for the ESP32 weather station.
//!
//! Registers every route of the station's [`Dispatcher`] on the esp-idf
//! HTTP server. The server runs its handlers on a single task, so requests
//! are answered one at a time; the mutex only satisfies the handler's
//! `Send + 'static` bound.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::Write;
use log::info;

use weather_core::{Dispatcher, HygroThermometer, StationConfig};

/// Dispatcher shared by the registered handlers.
pub type SharedDispatcher<S, D> = Arc<Mutex<Dispatcher<S, D>>>;

/// Handler task stack; sensor polls and JSON encoding need more than the default.
const HANDLER_STACK_SIZE: usize = 10240;

/// At most a few concurrent clients.
const MAX_OPEN_SOCKETS: usize = 4;

/// Start the HTTP server on the configured port and register the station routes.
///
/// The returned server must be kept alive for as long as the station serves.
pub fn start_http_server<S, D>(
    config: &StationConfig,
    dispatcher: SharedDispatcher<S, D>,
) -> Result<EspHttpServer<'static>>
where
    S: HygroThermometer + Send + 'static,
    D: DelayNs + Send + 'static,
{
    let mut server = EspHttpServer::new(&Configuration {
        http_port: config.http_port,
        stack_size: HANDLER_STACK_SIZE,
        max_open_sockets: MAX_OPEN_SOCKETS,
        ..Default::default()
    })?;

    register_routes(&mut server, dispatcher)?;
    info!("HTTP server started on port {}", config.http_port);

    Ok(server)
}

/// Register a `GET` handler for every path in the dispatcher's route table.
///
/// Unregistered paths get the server's default 404.
pub fn register_routes<S, D>(
    server: &mut EspHttpServer<'static>,
    dispatcher: SharedDispatcher<S, D>,
) -> Result<()>
where
    S: HygroThermometer + Send + 'static,
    D: DelayNs + Send + 'static,
{
    let paths = dispatcher
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .paths();

    for path in paths {
        let dispatcher = dispatcher.clone();
        server.fn_handler::<anyhow::Error, _>(path, Method::Get, move |req| {
            let response = dispatcher
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .dispatch(path);

            match response {
                Some(response) => {
                    let headers = [("Content-Type", response.content_type)];
                    let mut resp = req.into_response(response.status, None, &headers)?;
                    resp.write_all(response.body.as_bytes())?;
                }
                None => {
                    req.into_status_response(404)?;
                }
            }
            Ok(())
        })?;
        info!("Registered GET {}", path);
    }

    Ok(())
}
