//! # Engine Errors
//!
//! Every command sent through a [`KvClient`](crate::KvClient) resolves to
//! `Result<T, KvError>`. Channel failures and command failures share one enum so callers
//! only have one thing to match on.

/// Errors produced by the key-value engine or by the channel in front of it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KvError {
    #[error("Engine closed")]
    EngineClosed,
    #[error("Engine dropped response channel")]
    EngineDropped,
    #[error("WRONGTYPE operation against key {0:?} holding the wrong kind of value")]
    WrongType(String),
    #[error("value at key {0:?} is not an integer")]
    NotAnInteger(String),
    #[error("increment of key {0:?} would overflow")]
    Overflow(String),
    #[error("engine unavailable: {0}")]
    Unavailable(String),
}
