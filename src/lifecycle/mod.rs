//! # Lifecycle
//!
//! Everything needed to run the services as processes:
//!
//! - [`config`]: settings from the environment with per-service defaults.
//! - [`tracing`](mod@tracing): subscriber setup.
//! - [`system`]: spawning each service's engine and HTTP server, and shutting them down.

pub mod config;
pub mod system;
pub mod tracing;

pub use config::Config;
pub use system::{
    start_item_service, start_order_service, LifecycleError, ServiceHandle, Stockroom, Storage,
};
pub use self::tracing::setup_tracing;
