//! Axum routes for the weather station.
//!
//! The router is generated from the dispatcher's route table, so the paths
//! served here are exactly the ones the station registers. Paths outside
//! the table fall through to Axum's default 404.

use std::net::SocketAddr;
use std::sync::{MutexGuard, PoisonError};

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
    routing::get,
    Router,
};
use embedded_hal::delay::DelayNs;
use tokio::net::TcpListener;
use tracing::{error, info};

use weather_core::{Dispatcher, HygroThermometer, Response};

use crate::SharedDispatcher;

/// Create the Axum router serving every registered station route with `GET`.
pub fn create_router<S, D>(dispatcher: SharedDispatcher<S, D>) -> Router
where
    S: HygroThermometer + Send + 'static,
    D: DelayNs + Send + 'static,
{
    let paths = lock(&dispatcher).paths();

    paths.into_iter().fold(Router::new(), |router, path| {
        let dispatcher = dispatcher.clone();
        router.route(path, get(move || respond(dispatcher.clone(), path)))
    })
}

/// Bind `addr` and serve `router` until the listener fails.
pub async fn serve(addr: SocketAddr, router: Router) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server started on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

/// Run the dispatcher for `path` on the blocking pool.
///
/// Sensor polls sleep for the settling delay, so they must not run on an
/// async worker thread.
async fn respond<S, D>(dispatcher: SharedDispatcher<S, D>, path: &'static str) -> HttpResponse
where
    S: HygroThermometer + Send + 'static,
    D: DelayNs + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || lock(&dispatcher).dispatch(path)).await;

    match result {
        Ok(Some(response)) => into_http(response),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("Handler for {} did not complete: {}", path, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn into_http(response: Response) -> HttpResponse {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, response.content_type)],
        response.body,
    )
        .into_response()
}

// Recover from poisoning left by a panicked handler
fn lock<S, D>(dispatcher: &SharedDispatcher<S, D>) -> MutexGuard<'_, Dispatcher<S, D>> {
    dispatcher.lock().unwrap_or_else(PoisonError::into_inner)
}
