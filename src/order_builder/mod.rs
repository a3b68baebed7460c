//! # Order Builder
//!
//! Turns a list of requested `(item id, quantity)` lines into a persisted [`Order`], but only
//! when every line is backed by enough stock in the catalog.
//!
//! ## Pipeline
//!
//! ```text
//! Start ──► Allocating ──► Verifying(0) ──► … ──► Verifying(n-1) ──► Persisting ──► Done
//!   │            │              │                      │                 │
//!   └────────────┴──────────────┴──────── Failed ◄─────┴─────────────────┘
//! ```
//!
//! 1. An empty request is rejected before anything else happens.
//! 2. An order id is allocated. It stays consumed whatever happens next.
//! 3. Each line is fetched from the item service and checked, in the order given. The
//!    first failing line ends the build; later lines are never fetched.
//! 4. The order is assembled (lines sorted by item id) and written in one atomic `HSET`.
//!
//! Because persistence is the last step, dropping a `build` future part-way through can
//! never leave a stored order behind.
//!
//! ## Known gap
//!
//! Verification reads stock but does not reserve it, and creating an order does not
//! decrement stock. Two builds racing for the same entry can both pass verification.

pub mod error;

pub use error::OrderError;

use crate::clients::{verify, ItemLookup};
use crate::model::{Order, OrderId, OrderLine};
use crate::store::{OrderStore, SequenceAllocator};
use kv_actor::{KvClient, KvEngine};
use std::fmt;
use tracing::{debug, info, info_span, warn, Instrument};

/// Where a build currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildState {
    Start,
    Allocating,
    Verifying { index: usize, item_id: String },
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildState::Start => write!(f, "start"),
            BuildState::Allocating => write!(f, "allocating"),
            BuildState::Verifying { index, .. } => write!(f, "verifying({index})"),
            BuildState::Persisting => write!(f, "persisting"),
            BuildState::Done => write!(f, "done"),
            BuildState::Failed => write!(f, "failed"),
        }
    }
}

/// Builds and persists orders.
///
/// Holds no per-build state, so one builder can serve any number of concurrent builds.
#[derive(Debug, Clone)]
pub struct OrderBuilder<L, E = KvClient> {
    lookup: L,
    sequence: SequenceAllocator<E>,
    orders: OrderStore<E>,
}

impl<L: ItemLookup, E: KvEngine + Clone> OrderBuilder<L, E> {
    /// Allocates ids and stores orders through the same engine.
    pub fn new(lookup: L, engine: E) -> Self {
        Self {
            lookup,
            sequence: SequenceAllocator::new(engine.clone()),
            orders: OrderStore::new(engine),
        }
    }
}

impl<L: ItemLookup, E: KvEngine> OrderBuilder<L, E> {
    pub fn from_parts(lookup: L, sequence: SequenceAllocator<E>, orders: OrderStore<E>) -> Self {
        Self {
            lookup,
            sequence,
            orders,
        }
    }

    pub fn orders(&self) -> &OrderStore<E> {
        &self.orders
    }

    /// Runs the full pipeline for `lines`.
    pub async fn build(&self, lines: Vec<OrderLine>) -> Result<Order, OrderError> {
        let span = info_span!("build_order", lines = lines.len(), order_id = tracing::field::Empty);
        let mut state = BuildState::Start;

        let result = self.run(lines, &mut state).instrument(span.clone()).await;

        span.in_scope(|| match &result {
            Ok(order) => info!(id = %order.id, lines = order.lines.len(), "Order built"),
            Err(e) => {
                warn!(error = %e, failed_at = %state, "Order build failed");
                transition(&mut state, BuildState::Failed);
            }
        });
        result
    }

    async fn run(&self, lines: Vec<OrderLine>, state: &mut BuildState) -> Result<Order, OrderError> {
        debug!(?lines, "Build requested");
        if lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        transition(state, BuildState::Allocating);
        let id: OrderId = self.sequence.next().await.map_err(OrderError::Sequence)?;
        tracing::Span::current().record("order_id", tracing::field::display(id));

        for (index, line) in lines.iter().enumerate() {
            transition(
                state,
                BuildState::Verifying {
                    index,
                    item_id: line.item_id.clone(),
                },
            );
            let entry = self.lookup.fetch(&line.item_id).await?;
            verify(&line.item_id, Some(&entry), line.qty)?;
        }

        transition(state, BuildState::Persisting);
        let order = Order::new(id, lines);
        if order.has_duplicate_items() {
            warn!(order_id = %id, "Item requested more than once; the last line wins when stored");
        }
        self.orders
            .set(&order)
            .await
            .map_err(OrderError::Persistence)?;

        transition(state, BuildState::Done);
        Ok(order)
    }
}

fn transition(state: &mut BuildState, next: BuildState) {
    debug!(from = %state, to = %next, "State transition");
    *state = next;
}
