use std::net::SocketAddr;

use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_core::{Dispatcher, HygroThermometer, RawReading, StationConfig, StationContext};
use weather_server::{create_router, shared, StdDelay};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,weather_core=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    tracing::info!("Weather station '{}' starting...", config.name);

    let bind_addr: SocketAddr = match std::env::var("WEATHER_BIND_ADDR") {
        Ok(addr) => addr.parse().context("WEATHER_BIND_ADDR")?,
        Err(_) => SocketAddr::from(([0, 0, 0, 0], config.http_port)),
    };

    let fail_every = env_parse::<u32>("WEATHER_SIM_FAIL_EVERY")?.unwrap_or(0);
    let sensor = SimulatedSensor::new(fail_every);

    let dispatcher = Dispatcher::new(StationContext::new(sensor, StdDelay, &config));
    let app = create_router(shared(dispatcher)).layer(TraceLayer::new_for_http());

    tracing::info!("Try these commands:");
    tracing::info!("   curl http://localhost:{}/", bind_addr.port());
    tracing::info!("   curl http://localhost:{}/temp", bind_addr.port());
    tracing::info!("   curl http://localhost:{}/humidity", bind_addr.port());

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        result = weather_server::serve(bind_addr, app) => {
            if let Err(e) = result {
                tracing::error!("HTTP server error: {:#}", e);
                return Err(e);
            }
            tracing::warn!("HTTP server stopped");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Station config with environment overrides.
fn load_config() -> anyhow::Result<StationConfig> {
    let mut config = StationConfig::default();

    if let Ok(name) = std::env::var("WEATHER_NAME") {
        config.name = name;
    }
    if let Some(port) = env_parse("WEATHER_HTTP_PORT")? {
        config.http_port = port;
    }
    if let Some(settle) = env_parse("WEATHER_SETTLE_MS")? {
        config.settle_delay_ms = settle;
    }
    if let Ok(policy) = std::env::var("WEATHER_FAILURE_POLICY") {
        config.failure_policy = policy.parse()?;
    }

    config.validate()?;
    Ok(config)
}

fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => Ok(Some(value.parse().with_context(|| format!("{}={}", key, value))?)),
        Err(_) => Ok(None),
    }
}

/// Simulated DHT22 - slow drift around a mild indoor climate.
struct SimulatedSensor {
    reads: u32,
    fail_every: u32,
}

impl SimulatedSensor {
    fn new(fail_every: u32) -> Self {
        Self {
            reads: 0,
            fail_every,
        }
    }
}

impl HygroThermometer for SimulatedSensor {
    fn read(&mut self) -> RawReading {
        self.reads = self.reads.wrapping_add(1);

        if self.fail_every > 0 && self.reads % self.fail_every == 0 {
            return RawReading::failed();
        }

        let phase = self.reads as f32 * 0.1;
        let temperature_c = 22.0 + phase.sin() * 1.5;
        let humidity = 45.0 + phase.cos() * 5.0;

        // The real sensor reports tenths
        RawReading::from_celsius(
            (humidity * 10.0).round() / 10.0,
            (temperature_c * 10.0).round() / 10.0,
        )
    }
}
