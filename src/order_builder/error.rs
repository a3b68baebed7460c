use crate::model::ParseError;
use crate::store::StoreError;
use axum::http::StatusCode;
use kv_actor::KvError;

/// Why an order could not be built.
///
/// Every failure is terminal for the build that produced it; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order contains no items")]
    EmptyOrder,
    #[error("item {0} not found")]
    NotFound(String),
    #[error("insufficient stock for item {item_id}: wanted {want}, available {available}")]
    InsufficientStock {
        item_id: String,
        want: u64,
        available: u64,
    },
    #[error("item service unreachable: {0}")]
    Transport(String),
    #[error("item service sent an unreadable response: {0}")]
    Protocol(String),
    #[error("unable to allocate order id: {0}")]
    Sequence(#[source] KvError),
    #[error("unable to persist order: {0}")]
    Persistence(#[source] StoreError),
    #[error("malformed order record: {0}")]
    Parse(#[from] ParseError),
}

impl OrderError {
    /// HTTP status the order service answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::EmptyOrder | OrderError::InsufficientStock { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::Transport(_) | OrderError::Protocol(_) => StatusCode::BAD_GATEWAY,
            OrderError::Sequence(_) | OrderError::Persistence(_) | OrderError::Parse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
