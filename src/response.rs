//! The JSON envelope every HTTP response is wrapped in:
//!
//! ```json
//! {"status": 200, "message": "item retrieved", "count": 1, "data": [ ... ]}
//! ```
//!
//! `data` is `null` when there is nothing to return, and `count` always equals its length.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub message: String,
    #[serde(default)]
    pub count: usize,
    pub data: Option<Vec<T>>,
}

impl<T> Envelope<T> {
    pub fn with_data(status: StatusCode, message: impl Into<String>, data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            status: status.as_u16(),
            message: message.into(),
            count,
            data: (count > 0).then_some(data),
        }
    }

    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            count: 0,
            data: None,
        }
    }

    /// Consumes the envelope, yielding its entries (none when `data` is `null`).
    pub fn into_data(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_serializes_null_data() {
        let envelope = Envelope::<u32>::empty(StatusCode::NOT_FOUND, "resource not found");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": 404, "message": "resource not found", "count": 0, "data": null})
        );
    }

    #[test]
    fn test_count_tracks_data() {
        let envelope = Envelope::with_data(StatusCode::OK, "ok", vec!["a", "b"]);
        assert_eq!(envelope.count, 2);

        let envelope = Envelope::<&str>::with_data(StatusCode::OK, "ok", vec![]);
        assert_eq!(envelope.count, 0);
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn test_decode_tolerates_missing_count() {
        let envelope: Envelope<u32> =
            serde_json::from_value(json!({"status": 200, "message": "x", "data": [1]})).unwrap();
        assert_eq!(envelope.count, 0);
        assert_eq!(envelope.into_data(), vec![1]);
    }
}
