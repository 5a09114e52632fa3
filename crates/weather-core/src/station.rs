//! Route table and dispatcher.
//!
//! Every HTTP front end (esp-idf httpd on the device, Axum on Linux) hands
//! requests to a [`Dispatcher`]. The dispatcher owns the [`StationContext`]
//! (sensor reader plus the cache of the last good reading) and maps a request
//! path to a handler registered once at startup.
//!
//! Handling is strictly sequential: `dispatch` takes `&mut self`, so the
//! poll, serialize and respond steps of one request are never interleaved
//! with another.

use embedded_hal::delay::DelayNs;
use tracing::{debug, error};

use crate::codec::{self, ReadingPayload};
use crate::config::{FailurePolicy, StationConfig};
use crate::model::SensorSample;
use crate::sensor::{HygroThermometer, SensorReadError, SensorReader};

/// Body of the `/` route.
pub const BANNER: &str = "Hello from the weather station, read from /temp or /humidity";

/// Content type of every station response.
pub const CONTENT_TYPE: &str = "text/plain";

/// Body of a sensor route when the poll failed and the policy is [`FailurePolicy::Unavailable`].
pub const UNAVAILABLE_BODY: &str = "Sensor unavailable";

/// A plain-text HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    /// 200 with a plain-text body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: CONTENT_TYPE,
            body: body.into(),
        }
    }

    /// 503 for a failed sensor poll.
    pub fn unavailable() -> Self {
        Self {
            status: 503,
            content_type: CONTENT_TYPE,
            body: UNAVAILABLE_BODY.to_string(),
        }
    }
}

/// The last good reading and its serialized payload.
///
/// Both are replaced together on a successful poll and left untouched
/// otherwise. Before the first good poll the payload is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingCache {
    sample: Option<SensorSample>,
    payload: String,
}

impl ReadingCache {
    pub fn sample(&self) -> Option<&SensorSample> {
        self.sample.as_ref()
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// State shared by all route handlers.
pub struct StationContext<S, D> {
    reader: SensorReader<S, D>,
    cache: ReadingCache,
    failure_policy: FailurePolicy,
}

impl<S: HygroThermometer, D: DelayNs> StationContext<S, D> {
    /// Create a context from a sensor driver, a delay provider and the station config.
    pub fn new(sensor: S, delay: D, config: &StationConfig) -> Self {
        Self {
            reader: SensorReader::with_settle_delay(sensor, delay, config.settle_delay_ms),
            cache: ReadingCache::default(),
            failure_policy: config.failure_policy,
        }
    }

    /// Poll the sensor and, on success, replace the cached sample and payload.
    pub fn refresh(&mut self) -> Result<(), SensorReadError> {
        let sample = self.reader.poll()?;

        match codec::serialize(&sample) {
            Ok(payload) => {
                self.cache = ReadingCache {
                    sample: Some(sample),
                    payload,
                };
            }
            // Sample and payload are replaced together or not at all
            Err(e) => error!("Failed to serialize reading: {}", e),
        }
        Ok(())
    }

    pub fn cache(&self) -> &ReadingCache {
        &self.cache
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Refresh, then decide whether the failure (if any) should be surfaced.
    fn refresh_for_route(&mut self) -> Option<Response> {
        match (self.refresh(), self.failure_policy) {
            (Err(_), FailurePolicy::Unavailable) => Some(Response::unavailable()),
            _ => None,
        }
    }
}

/// A route handler.
pub type Handler<S, D> = fn(&mut StationContext<S, D>) -> Response;

/// One entry of the route table.
pub struct Route<S, D> {
    pub path: &'static str,
    handler: Handler<S, D>,
}

/// Matches request paths against the route table and runs the handler.
pub struct Dispatcher<S, D> {
    routes: Vec<Route<S, D>>,
    context: StationContext<S, D>,
}

impl<S: HygroThermometer, D: DelayNs> Dispatcher<S, D> {
    /// Create a dispatcher with the station routes (`/`, `/temp`, `/humidity`).
    pub fn new(context: StationContext<S, D>) -> Self {
        Self {
            routes: Vec::new(),
            context,
        }
        .route("/", handle_root)
        .route("/temp", handle_temp)
        .route("/humidity", handle_humidity)
    }

    /// Register a handler. A later registration for the same path replaces the earlier one.
    pub fn route(mut self, path: &'static str, handler: Handler<S, D>) -> Self {
        self.routes.retain(|r| r.path != path);
        self.routes.push(Route { path, handler });
        self
    }

    /// Registered paths, in registration order.
    pub fn paths(&self) -> Vec<&'static str> {
        self.routes.iter().map(|r| r.path).collect()
    }

    /// Handle a request for `uri`. Returns `None` if no route matches.
    pub fn dispatch(&mut self, uri: &str) -> Option<Response> {
        let path = route_path(uri);
        let handler = self.routes.iter().find(|r| r.path == path)?.handler;
        debug!("Dispatching {}", path);
        Some(handler(&mut self.context))
    }

    pub fn context(&self) -> &StationContext<S, D> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut StationContext<S, D> {
        &mut self.context
    }
}

/// Strip the query string and fragment from a request URI.
pub fn route_path(uri: &str) -> &str {
    let end = uri.find(|c| c == '?' || c == '#').unwrap_or(uri.len());
    &uri[..end]
}

fn handle_root<S, D>(_context: &mut StationContext<S, D>) -> Response {
    Response::ok(BANNER)
}

fn handle_temp<S: HygroThermometer, D: DelayNs>(context: &mut StationContext<S, D>) -> Response {
    if let Some(response) = context.refresh_for_route() {
        return response;
    }

    if let Some(sample) = context.cache.sample() {
        debug!("{}", ReadingPayload::from(sample));
    }
    Response::ok(context.cache.payload())
}

fn handle_humidity<S: HygroThermometer, D: DelayNs>(
    context: &mut StationContext<S, D>,
) -> Response {
    if let Some(response) = context.refresh_for_route() {
        return response;
    }

    match context.cache.sample() {
        Some(sample) => Response::ok(format!("Humidity: {}%", sample.humidity_rounded())),
        None => Response::ok(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heat_index::heat_index_f;
    use crate::model::{fahrenheit_to_celsius, RawReading};
    use crate::sensor::tests::{RecordingDelay, ScriptedSensor};
    use pretty_assertions::assert_eq;

    fn reading_f(temperature_f: f32, humidity: f32) -> RawReading {
        RawReading {
            humidity,
            temperature_c: fahrenheit_to_celsius(temperature_f),
            temperature_f,
        }
    }

    fn dispatcher_with(
        readings: Vec<RawReading>,
        failure_policy: FailurePolicy,
    ) -> Dispatcher<ScriptedSensor, RecordingDelay> {
        let config = StationConfig {
            failure_policy,
            ..Default::default()
        };
        let context =
            StationContext::new(ScriptedSensor::new(readings), RecordingDelay::default(), &config);
        Dispatcher::new(context)
    }

    fn dispatcher(readings: Vec<RawReading>) -> Dispatcher<ScriptedSensor, RecordingDelay> {
        dispatcher_with(readings, FailurePolicy::ServeStale)
    }

    #[test]
    fn test_root_banner() {
        let mut d = dispatcher(vec![]);
        let response = d.dispatch("/").unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "text/plain");
        assert!(response.body.contains("weather"));
        // The banner never touches the sensor
        assert_eq!(d.context().reader.delay().total_ns, 0);
        assert!(d.context().cache().sample().is_none());
    }

    #[test]
    fn test_root_banner_independent_of_sensor() {
        let mut d = dispatcher(vec![RawReading::failed()]);
        d.dispatch("/temp").unwrap();
        let response = d.dispatch("/").unwrap();
        assert_eq!(response.status, 200);
        assert!(response.body.contains("weather"));
    }

    #[test]
    fn test_humidity_rounded() {
        let mut d = dispatcher(vec![reading_f(70.0, 55.4)]);
        let response = d.dispatch("/humidity").unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "Humidity: 55%");
    }

    #[test]
    fn test_temp_payload() {
        let mut d = dispatcher(vec![reading_f(72.3, 40.0)]);
        let response = d.dispatch("/temp").unwrap();
        assert_eq!(response.status, 200);

        let payload = codec::deserialize(&response.body).unwrap();
        assert!((payload.temp - 72.3).abs() < 1e-4);
        assert!((payload.humidity - 40.0).abs() < 1e-4);
        assert!((payload.heat_index - heat_index_f(72.3, 40.0)).abs() < 1e-4);
    }

    #[test]
    fn test_temp_stale_after_failure() {
        let mut d = dispatcher(vec![reading_f(72.3, 40.0), RawReading::failed()]);

        let first = d.dispatch("/temp").unwrap();
        let second = d.dispatch("/temp").unwrap();

        assert_eq!(second.status, 200);
        assert_eq!(first.body, second.body);
    }

    #[test]
    fn test_failed_poll_leaves_cache_untouched() {
        let mut d = dispatcher(vec![
            reading_f(72.3, 40.0),
            RawReading {
                humidity: f32::NAN,
                temperature_c: 20.0,
                temperature_f: 68.0,
            },
        ]);

        d.context_mut().refresh().unwrap();
        let before = d.context().cache().clone();

        assert_eq!(
            d.context_mut().refresh(),
            Err(SensorReadError::Humidity)
        );
        assert_eq!(d.context().cache(), &before);
    }

    #[test]
    fn test_first_failure_is_empty() {
        let mut d = dispatcher(vec![]);

        let temp = d.dispatch("/temp").unwrap();
        assert_eq!(temp.status, 200);
        assert_eq!(temp.body, "");

        let humidity = d.dispatch("/humidity").unwrap();
        assert_eq!(humidity.status, 200);
        assert_eq!(humidity.body, "");
    }

    #[test]
    fn test_humidity_poll_refreshes_temp_payload() {
        let mut d = dispatcher(vec![reading_f(80.0, 30.0), RawReading::failed()]);

        d.dispatch("/humidity").unwrap();
        let temp = d.dispatch("/temp").unwrap();

        let payload = codec::deserialize(&temp.body).unwrap();
        assert!((payload.temp - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_unavailable_policy() {
        let mut d = dispatcher_with(
            vec![reading_f(72.3, 40.0), RawReading::failed()],
            FailurePolicy::Unavailable,
        );

        assert_eq!(d.dispatch("/humidity").unwrap().status, 200);

        let response = d.dispatch("/temp").unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.body, UNAVAILABLE_BODY);
        // The last good reading is still cached
        assert!(d.context().cache().sample().is_some());
    }

    #[test]
    fn test_unmatched_path() {
        let mut d = dispatcher(vec![]);
        assert_eq!(d.dispatch("/pressure"), None);
        assert_eq!(d.dispatch("/temp/"), None);
    }

    #[test]
    fn test_query_string_ignored() {
        let mut d = dispatcher(vec![reading_f(70.0, 61.5)]);
        let response = d.dispatch("/humidity?units=metric").unwrap();
        assert_eq!(response.body, "Humidity: 62%");
    }

    #[test]
    fn test_route_path() {
        assert_eq!(route_path("/temp"), "/temp");
        assert_eq!(route_path("/temp?x=1"), "/temp");
        assert_eq!(route_path("/#top"), "/");
    }

    #[test]
    fn test_paths_and_custom_route() {
        fn handle_ping<S, D>(_: &mut StationContext<S, D>) -> Response {
            Response::ok("pong")
        }

        let mut d = dispatcher(vec![]).route("/ping", handle_ping);
        assert_eq!(d.paths(), vec!["/", "/temp", "/humidity", "/ping"]);
        assert_eq!(d.dispatch("/ping").unwrap().body, "pong");
    }

    #[test]
    fn test_each_poll_waits_settle_delay() {
        let mut d = dispatcher(vec![reading_f(70.0, 50.0), reading_f(70.0, 50.0)]);
        d.dispatch("/temp");
        d.dispatch("/humidity");
        d.dispatch("/");
        assert_eq!(d.context().reader.delay().total_ns, 4_000_000_000);
    }
}
