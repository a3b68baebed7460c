//! # Engine Messages
//!
//! The command set understood by [`KvActor`](crate::KvActor). Each variant carries its
//! arguments and a oneshot [`Response`] the actor answers on exactly once.

use crate::error::KvError;
use std::collections::HashMap;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the engine.
pub type Response<T> = oneshot::Sender<Result<T, KvError>>;

/// A request sent from a [`KvClient`](crate::KvClient) to the actor.
///
/// The variants mirror the primitives a Redis-style engine exposes. Multi-key or
/// multi-field variants (`Del`, `HSet`) are applied in one step by the actor, so they are
/// atomic with respect to every other request.
#[derive(Debug)]
pub enum KvRequest {
    Get {
        key: String,
        respond_to: Response<Option<String>>,
    },
    Set {
        key: String,
        value: String,
        respond_to: Response<()>,
    },
    /// Returns the number of fields that did not exist before.
    HSet {
        key: String,
        fields: HashMap<String, String>,
        respond_to: Response<u64>,
    },
    HGetAll {
        key: String,
        respond_to: Response<HashMap<String, String>>,
    },
    /// Returns how many of the keys existed.
    Del {
        keys: Vec<String>,
        respond_to: Response<u64>,
    },
    Incr {
        key: String,
        respond_to: Response<i64>,
    },
    /// Returns one page of keys and the cursor for the next page (`0` when done).
    Scan {
        cursor: u64,
        pattern: Option<String>,
        count: usize,
        respond_to: Response<(Vec<String>, u64)>,
    },
}
