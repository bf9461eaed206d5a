//! Demo endpoint that echoes a counter.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DemoQuery {
    pub counter: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoResponse {
    pub message: String,
    /// The raw query string, or the number `0` when absent or empty.
    pub counter: Value,
    pub timestamp: String,
    pub server_data: ServerData,
}

#[derive(Debug, Serialize)]
pub struct ServerData {
    pub random: f64,
    pub environment: String,
}

impl DemoResponse {
    fn new(counter: Option<String>, environment: &str) -> Self {
        let counter = match counter {
            Some(c) if !c.is_empty() => Value::String(c),
            _ => Value::from(0),
        };
        let label = match &counter {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            message: format!("Server response for counter: {label}"),
            counter,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            server_data: ServerData {
                random: rand::random::<f64>(),
                environment: environment.to_string(),
            },
        }
    }
}

/// `GET /api/demo?counter=…`
pub async fn demo(
    State(state): State<AppState>,
    Query(query): Query<DemoQuery>,
) -> Json<DemoResponse> {
    Json(DemoResponse::new(query.counter, &state.settings.environment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_echoed_as_text() {
        let response = DemoResponse::new(Some("5".into()), "development");
        assert_eq!(response.counter, Value::String("5".into()));
        assert_eq!(response.message, "Server response for counter: 5");
        assert!((0.0..1.0).contains(&response.server_data.random));
    }

    #[test]
    fn test_missing_or_empty_counter_is_zero() {
        for counter in [None, Some(String::new())] {
            let response = DemoResponse::new(counter, "development");
            assert_eq!(response.counter, Value::from(0));
            assert_eq!(response.message, "Server response for counter: 0");
        }
    }

    #[test]
    fn test_timestamp_has_millis() {
        let response = DemoResponse::new(None, "test");
        // 2024-01-01T00:00:00.000Z
        assert_eq!(response.timestamp.len(), 24);
        assert!(response.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&response.timestamp).is_ok());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(DemoResponse::new(Some("abc".into()), "staging")).unwrap();
        assert_eq!(json["counter"], "abc");
        assert_eq!(json["serverData"]["environment"], "staging");
        assert!(json["serverData"]["random"].is_f64());
    }
}
