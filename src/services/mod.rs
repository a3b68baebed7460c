//! # HTTP Surface
//!
//! Thin axum routers in front of the core. Handlers parse input, call one store or builder
//! operation, and wrap the outcome in an [`Envelope`](crate::response::Envelope); they hold
//! no logic of their own.
//!
//! Both routers answer unknown paths with a 404 envelope, cap request bodies at 1 MiB and
//! log every request through `tower-http`'s `TraceLayer`.

pub mod item_service;
pub mod order_service;

use crate::response::Envelope;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub(crate) type Reply = Envelope<serde_json::Value>;

pub(crate) async fn pong() -> Reply {
    Envelope::empty(StatusCode::OK, "pong")
}

pub(crate) async fn healthz() -> Reply {
    Envelope::empty(StatusCode::OK, "healthy")
}

pub(crate) async fn not_found() -> Reply {
    Envelope::empty(StatusCode::NOT_FOUND, "resource not found")
}

/// Serializes `data` into an envelope's payload.
pub(crate) fn reply<T: serde::Serialize>(
    status: StatusCode,
    message: impl Into<String>,
    data: Vec<T>,
) -> Reply {
    match data
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(values) => Envelope::with_data(status, message, values),
        Err(e) => {
            tracing::error!(error = %e, "Unable to serialize response");
            Envelope::empty(StatusCode::INTERNAL_SERVER_ERROR, "unable to serialize response")
        }
    }
}

pub(crate) fn with_common_layers(router: Router) -> Router {
    router
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
