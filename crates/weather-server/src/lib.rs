//! # weather-server
//!
//! HTTP front end for the weather station on Linux.
//!
//! This crate provides:
//! - An Axum router built from the station's route table
//! - A blocking [`StdDelay`] so the sensor reader can settle on a host thread
//!
//! ## Usage
//!
//! ```rust,ignore
//! use weather_server::{create_router, shared, StdDelay};
//!
//! let dispatcher = shared(Dispatcher::new(StationContext::new(sensor, StdDelay, &config)));
//! let app = create_router(dispatcher);
//!
//! let listener = TcpListener::bind("0.0.0.0:80").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod delay;
pub mod routes;

pub use delay::StdDelay;
pub use routes::{create_router, serve};

use std::sync::{Arc, Mutex};

use weather_core::Dispatcher;

/// Dispatcher shared by all Axum handlers.
///
/// The mutex serializes requests: one poll, serialize and respond sequence
/// runs at a time.
pub type SharedDispatcher<S, D> = Arc<Mutex<Dispatcher<S, D>>>;

/// Wrap a dispatcher for use with [`create_router`].
pub fn shared<S, D>(dispatcher: Dispatcher<S, D>) -> SharedDispatcher<S, D> {
    Arc::new(Mutex::new(dispatcher))
}
