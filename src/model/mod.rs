//! # Domain Model
//!
//! Plain data types shared by both services:
//!
//! - [`Item`]: a catalog entry, identified by the encoded form of its lower-cased name.
//! - [`Order`] / [`OrderLine`]: a committed set of `(item id, quantity)` lines.
//!
//! Both types know how to turn themselves into the flat string maps the key-value engine
//! stores, and back. Malformed stored records surface as [`ParseError`].

pub mod item;
pub mod order;

pub use item::Item;
pub use order::{Order, OrderId, OrderLine};

/// A stored record could not be turned back into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid order id {0:?}")]
    OrderId(String),
    #[error("field {field:?} holds {value:?}, expected a non-negative integer")]
    Quantity { field: String, value: String },
    #[error("record {key:?} is missing field {field:?}")]
    MissingField { key: String, field: &'static str },
}
