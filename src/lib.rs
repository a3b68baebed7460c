//! # Stockroom
//!
//! Two cooperating services over a shared catalog:
//!
//! - the **item service** holds catalog entries and their stock counts;
//! - the **order service** builds orders, and never commits one for stock the item service
//!   cannot back.
//!
//! ## Core
//!
//! - **[codec]**: deterministic, reversible ids derived from entry names.
//! - **[model]**: [`Item`](model::Item), [`Order`](model::Order) and their storage shapes.
//! - **[store]**: one generic repository over the [`kv_actor`] engine, plus the order id
//!   [`SequenceAllocator`](store::SequenceAllocator).
//! - **[clients]**: cross-service stock verification over HTTP.
//! - **[order_builder]**: the allocate → verify → persist pipeline.
//!
//! ## Around the core
//!
//! - **[services]**: axum routers for both services.
//! - **[response]**: the JSON envelope every endpoint answers with.
//! - **[lifecycle]**: configuration, tracing and process bootstrap.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use stockroom::lifecycle::{Config, Stockroom};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let system = Stockroom::start(&Config::default()).await?;
//!     // POST items to system.item.url(), then orders to system.order.url()
//!     system.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Testing
//!
//! Engine failures are scripted with [`kv_actor::mock::MockEngine`], catalog lookups with
//! [`clients::mock::MockLookup`]. End-to-end tests start both services on port 0.

pub mod clients;
pub mod codec;
pub mod lifecycle;
pub mod model;
pub mod order_builder;
pub mod response;
pub mod services;
pub mod store;
