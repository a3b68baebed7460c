//! Scripted [`ItemLookup`] for tests, in the same expectation-queue style as
//! [`kv_actor::mock::MockEngine`].
//!
//! ```rust
//! use stockroom::clients::mock::MockLookup;
//! use stockroom::clients::ItemLookup;
//! use stockroom::model::Item;
//!
//! #[tokio::main]
//! async fn main() {
//!     let widget = Item::new("widget", "", 3).unwrap();
//!     let mock = MockLookup::new();
//!     mock.expect_fetch(&widget.id).return_ok(widget.clone());
//!
//!     assert_eq!(mock.fetch(&widget.id).await.unwrap(), widget);
//!     mock.verify();
//! }
//! ```

use super::ItemLookup;
use crate::model::Item;
use crate::order_builder::OrderError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct Expectation {
    item_id: String,
    response: Result<Item, OrderError>,
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

#[derive(Clone, Default)]
pub struct MockLookup {
    expectations: Queue,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_fetch(&self, item_id: &str) -> FetchExpectationBuilder {
        FetchExpectationBuilder {
            item_id: item_id.to_string(),
            expectations: self.expectations.clone(),
        }
    }

    /// Item ids fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.expectations.lock().unwrap().len()
    }

    pub fn verify(&self) {
        let left = self.remaining();
        if left != 0 {
            panic!("Not all expectations were met. {left} remaining");
        }
    }
}

#[async_trait]
impl ItemLookup for MockLookup {
    async fn fetch(&self, item_id: &str) -> Result<Item, OrderError> {
        self.calls.lock().unwrap().push(item_id.to_string());
        let next = self.expectations.lock().unwrap().pop_front();
        match next {
            Some(expectation) => {
                assert_eq!(expectation.item_id, item_id, "fetch of unexpected item");
                expectation.response
            }
            None => panic!("Unexpected fetch of {item_id}"),
        }
    }
}

pub struct FetchExpectationBuilder {
    item_id: String,
    expectations: Queue,
}

impl FetchExpectationBuilder {
    pub fn return_ok(self, item: Item) {
        self.push(Ok(item));
    }

    pub fn return_err(self, error: OrderError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Item, OrderError>) {
        self.expectations.lock().unwrap().push_back(Expectation {
            item_id: self.item_id,
            response,
        });
    }
}
