//! # Cross-Service Verification
//!
//! The order service never reads the catalog's storage directly. It asks the item service
//! over HTTP for the current entry and checks the requested quantity against it.
//!
//! - [`ItemLookup`] is the seam: anything that can fetch one catalog entry by id.
//! - [`ItemServiceClient`] is the HTTP implementation.
//! - [`verify`] is the pure quantity check.
//! - [`mock::MockLookup`] scripts lookups for builder tests.

pub mod item_client;
pub mod mock;

pub use item_client::ItemServiceClient;

use crate::model::Item;
use crate::order_builder::OrderError;
use async_trait::async_trait;

/// Fetches the current state of one catalog entry.
#[async_trait]
pub trait ItemLookup: Send + Sync {
    /// Resolves to the entry whose `id` equals `item_id`, or [`OrderError::NotFound`].
    async fn fetch(&self, item_id: &str) -> Result<Item, OrderError>;
}

/// Checks that `entry` exists and holds at least `want` units.
///
/// A request for zero units passes as long as the entry exists.
pub fn verify(item_id: &str, entry: Option<&Item>, want: u64) -> Result<(), OrderError> {
    let entry = entry.ok_or_else(|| OrderError::NotFound(item_id.to_string()))?;
    if entry.qty < want {
        return Err(OrderError::InsufficientStock {
            item_id: entry.id.clone(),
            want,
            available: entry.qty,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(qty: u64) -> Item {
        Item::new("widget", "", qty).unwrap()
    }

    #[test]
    fn test_verify_missing_entry() {
        assert!(matches!(
            verify("abc", None, 1),
            Err(OrderError::NotFound(id)) if id == "abc"
        ));
    }

    #[test]
    fn test_verify_quantities() {
        let entry = widget(10);
        assert!(verify(&entry.id, Some(&entry), 10).is_ok());
        assert!(verify(&entry.id, Some(&entry), 0).is_ok());
        assert!(matches!(
            verify(&entry.id, Some(&entry), 11),
            Err(OrderError::InsufficientStock { want: 11, available: 10, .. })
        ));
    }

    #[test]
    fn test_verify_zero_stock() {
        let entry = widget(0);
        assert!(verify(&entry.id, Some(&entry), 0).is_ok());
        assert!(verify(&entry.id, Some(&entry), 1).is_err());
    }
}
