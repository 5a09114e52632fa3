//! Reading payload codec.
//!
//! The `/temp` route answers with a compact JSON object carrying three
//! numeric fields. This module builds that object from a [`SensorSample`]
//! and encodes/decodes it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SensorSample;

/// Errors that can occur during payload encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization or parsing failed.
    #[error("Failed to process payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// The structured payload served by `/temp`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadingPayload {
    /// Temperature in degrees Fahrenheit.
    pub temp: f32,

    /// Relative humidity in percent.
    pub humidity: f32,

    /// Heat index in degrees Fahrenheit.
    pub heat_index: f32,
}

impl From<&SensorSample> for ReadingPayload {
    fn from(sample: &SensorSample) -> Self {
        Self {
            temp: sample.temperature_f,
            humidity: sample.humidity_pct,
            heat_index: sample.heat_index_f,
        }
    }
}

/// Human-facing rendering with whole numbers (fractions truncated).
impl fmt::Display for ReadingPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"temp\":{}, \"humidity\": {}, \"heat_index\": {}}}",
            self.temp as i32, self.humidity as i32, self.heat_index as i32
        )
    }
}

/// Encode a sample as the `/temp` JSON payload.
pub fn serialize(sample: &SensorSample) -> Result<String, CodecError> {
    serde_json::to_string(&ReadingPayload::from(sample)).map_err(CodecError::from)
}

/// Decode a `/temp` JSON payload.
pub fn deserialize(text: &str) -> Result<ReadingPayload, CodecError> {
    serde_json::from_str(text).map_err(CodecError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(temperature_f: f32, humidity_pct: f32, heat_index_f: f32) -> SensorSample {
        SensorSample {
            temperature_f,
            temperature_c: (temperature_f - 32.0) / 1.8,
            humidity_pct,
            heat_index_f,
            heat_index_c: (heat_index_f - 32.0) / 1.8,
        }
    }

    #[test]
    fn test_serialize_fields() {
        let json = serialize(&sample(72.3, 40.0, 70.1)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert!((value["temp"].as_f64().unwrap() - 72.3).abs() < 1e-4);
        assert!((value["humidity"].as_f64().unwrap() - 40.0).abs() < 1e-4);
        assert!((value["heat_index"].as_f64().unwrap() - 70.1).abs() < 1e-4);
    }

    #[test]
    fn test_serialize_field_order() {
        let json = serialize(&sample(72.5, 40.0, 71.25)).unwrap();
        assert_eq!(json, r#"{"temp":72.5,"humidity":40.0,"heat_index":71.25}"#);
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let s = sample(-4.2, 99.9, -8.0);
        assert_eq!(serialize(&s).unwrap(), serialize(&s).unwrap());
    }

    #[test]
    fn test_parse_back() {
        for (t, h) in [(-40.0, 0.0), (32.0, 12.5), (104.9, 100.0)] {
            let s = sample(t, h, t + 1.5);
            let payload = deserialize(&serialize(&s).unwrap()).unwrap();
            assert_eq!(payload, ReadingPayload::from(&s));
        }
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(matches!(deserialize("Humidity: 55%"), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_display_truncates() {
        let payload = ReadingPayload {
            temp: 72.9,
            humidity: 40.6,
            heat_index: 71.1,
        };
        assert_eq!(
            payload.to_string(),
            r#"{"temp":72, "humidity": 40, "heat_index": 71}"#
        );
    }
}
