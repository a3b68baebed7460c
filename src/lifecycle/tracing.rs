//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the global subscriber once per process.
//!
//! - `RUST_LOG`, when set, wins over the configured level.
//! - Compact output hides module paths (`with_target(false)`); the structured fields carry
//!   the context instead.
//! - JSON output is available for log shippers.
//!
//! ## What gets traced
//!
//! - **Engine**: start, shutdown and final key count; every command at `debug`.
//! - **Stores**: writes and deletes at `info`, reads and scans at `debug`.
//! - **Order builds**: a `build_order` span carrying `order_id`, one `debug` line per state
//!   transition, and a final `info` or `warn` with the outcome.
//! - **HTTP**: one span per request from `tower-http`.
//!
//! ```bash
//! # Show state transitions and engine commands
//! RUST_LOG=debug stockroom all
//!
//! # Only the order pipeline
//! RUST_LOG=stockroom::order_builder=debug stockroom order
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
