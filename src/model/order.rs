//! # Orders
//!
//! An [`Order`] is the committed result of a successful build: an id handed out by the
//! sequence allocator plus the requested lines, sorted by item id.
//!
//! ## Storage contract
//!
//! ```text
//! key    "<id>"                       (the store adds the "order:" namespace)
//! fields { "<item id>": "<qty>", ... }
//! ```
//!
//! Hash fields come back from the engine in no particular order, so [`Order::from_storage`]
//! sorts them; an order read back compares equal to the one written.

use crate::model::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .map(Self)
            .map_err(|_| ParseError::OrderId(s.to_string()))
    }
}

/// One requested `(item id, quantity)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "id")]
    pub item_id: String,
    pub qty: u64,
}

impl OrderLine {
    pub fn new(item_id: impl Into<String>, qty: u64) -> Self {
        Self {
            item_id: item_id.into(),
            qty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "items")]
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Builds an order with its lines sorted ascending by item id.
    ///
    /// The sort is stable, so repeated item ids keep the order the caller gave them in.
    pub fn new(id: OrderId, mut lines: Vec<OrderLine>) -> Self {
        lines.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        Self { id, lines }
    }

    /// Splits the order into its storage key and field map.
    ///
    /// A repeated item id collapses into one field holding the last line's quantity.
    pub fn to_storage(&self) -> (String, HashMap<String, u64>) {
        let fields = self
            .lines
            .iter()
            .map(|line| (line.item_id.clone(), line.qty))
            .collect();
        (self.id.to_string(), fields)
    }

    pub fn from_storage(key: &str, fields: HashMap<String, u64>) -> Result<Self, ParseError> {
        let id: OrderId = key.parse()?;
        let lines = fields
            .into_iter()
            .map(|(item_id, qty)| OrderLine { item_id, qty })
            .collect();
        Ok(Self::new(id, lines))
    }

    pub fn has_duplicate_items(&self) -> bool {
        self.lines
            .windows(2)
            .any(|pair| pair[0].item_id == pair[1].item_id)
    }
}
