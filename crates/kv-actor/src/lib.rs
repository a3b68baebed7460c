//! # KV Actor
//!
//! An in-process key-value engine built on the Actor Model. One [`KvActor`] owns a keyspace
//! and processes every command sequentially from an mpsc channel; any number of cheap,
//! cloneable [`KvClient`] handles talk to it through oneshot replies.
//!
//! ## Guarantees
//!
//! The services in this workspace rely on two engine properties:
//!
//! - **Atomic increments**: `INCR` on a counter key never hands the same value to two callers.
//! - **Atomic multi-field writes**: `HSET` with a full field map is applied all-or-nothing.
//!
//! The actor is the only owner of the keyspace and handles one message at a time, so both
//! hold without locks.
//!
//! ## Data model
//!
//! Every key holds a [`Value`]: either a plain string or a hash of string fields. Commands
//! of one family used on a key of the other family fail with [`KvError::WrongType`].
//!
//! | Command | Family | Notes |
//! |---------|--------|-------|
//! | `get` / `set` | string | `get` on a missing key is `None` |
//! | `incr` | string | missing key counts as `0` |
//! | `hset` / `hgetall` | hash | `hgetall` on a missing key is an empty map |
//! | `del` | any | returns the number of keys removed |
//! | `scan` | any | cursor based, glob `MATCH` patterns with `*` and `?` |
//!
//! ## Usage
//!
//! ```rust
//! use kv_actor::KvActor;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = KvActor::new(32);
//!     let handle = tokio::spawn(actor.run());
//!
//!     assert_eq!(client.incr("nextID").await.unwrap(), 1);
//!     assert_eq!(client.incr("nextID").await.unwrap(), 2);
//!
//!     drop(client);
//!     handle.await.unwrap();
//! }
//! ```
//!
//! ## Seams
//!
//! Code that needs storage is written against the [`KvEngine`] trait rather than the concrete
//! client. Tests that need to inject engine failures use [`mock::MockEngine`].
//!
//! [`RedisEngine`] implements the same trait against a Redis server, for keyspaces that must
//! outlive the process or be shared between processes. [`Backend`] holds either one.

pub mod actor;
pub mod backend;
pub mod client;
pub mod engine;
pub mod error;
pub mod message;
pub mod mock;
pub mod pattern;
pub mod remote;
pub mod value;

pub use actor::KvActor;
pub use backend::Backend;
pub use client::KvClient;
pub use engine::KvEngine;
pub use error::KvError;
pub use message::{KvRequest, Response};
pub use remote::RedisEngine;
pub use value::Value;
