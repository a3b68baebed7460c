//! # Mock Engine
//!
//! [`MockEngine`] hands out a real [`KvClient`] whose requests are answered from a queue of
//! expectations instead of a keyspace. It is the easiest way to make the engine fail at an
//! exact point (an `HSET` that errors after an `INCR` that succeeded, for instance), which
//! is awkward to provoke with a real [`KvActor`](crate::KvActor).
//!
//! | | MockEngine | KvActor |
//! |---|---|---|
//! | **State** | none, scripted replies | real keyspace |
//! | **Ordering** | replies in queue order | real command semantics |
//! | **Error injection** | `return_err` | only type errors |
//!
//! Expectations are consumed in order. A request that does not match the next expectation
//! (wrong command or wrong key) panics the mock task, which callers observe as
//! [`KvError::EngineDropped`]; [`MockEngine::verify`] then reports what was left.
//!
//! ```rust
//! use kv_actor::mock::MockEngine;
//! use kv_actor::KvError;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockEngine::new();
//!     mock.expect_incr("nextID").return_ok(7);
//!     mock.expect_hset("order:7")
//!         .return_err(KvError::Unavailable("connection reset".into()));
//!
//!     let client = mock.client();
//!     assert_eq!(client.incr("nextID").await, Ok(7));
//!     assert!(client.hset("order:7", Default::default()).await.is_err());
//!     mock.verify();
//! }
//! ```

use crate::client::KvClient;
use crate::error::KvError;
use crate::message::KvRequest;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

enum Expectation {
    Get {
        key: String,
        response: Result<Option<String>, KvError>,
    },
    Set {
        key: String,
        response: Result<(), KvError>,
    },
    HSet {
        key: String,
        response: Result<u64, KvError>,
    },
    HGetAll {
        key: String,
        response: Result<HashMap<String, String>, KvError>,
    },
    Del {
        response: Result<u64, KvError>,
    },
    Incr {
        key: String,
        response: Result<i64, KvError>,
    },
    Scan {
        response: Result<(Vec<String>, u64), KvError>,
    },
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

/// A scripted engine with expectation tracking.
pub struct MockEngine {
    client: KvClient,
    expectations: Queue,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<KvRequest>(100);
        let expectations: Queue = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = queue.lock().unwrap().pop_front();

                match (request, next) {
                    (
                        KvRequest::Get { key, respond_to },
                        Some(Expectation::Get { key: want, response }),
                    ) => {
                        assert_eq!(key, want, "GET on unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (
                        KvRequest::Set {
                            key, respond_to, ..
                        },
                        Some(Expectation::Set { key: want, response }),
                    ) => {
                        assert_eq!(key, want, "SET on unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (
                        KvRequest::HSet {
                            key, respond_to, ..
                        },
                        Some(Expectation::HSet { key: want, response }),
                    ) => {
                        assert_eq!(key, want, "HSET on unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (
                        KvRequest::HGetAll { key, respond_to },
                        Some(Expectation::HGetAll { key: want, response }),
                    ) => {
                        assert_eq!(key, want, "HGETALL on unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (KvRequest::Del { respond_to, .. }, Some(Expectation::Del { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        KvRequest::Incr { key, respond_to },
                        Some(Expectation::Incr { key: want, response }),
                    ) => {
                        assert_eq!(key, want, "INCR on unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (KvRequest::Scan { respond_to, .. }, Some(Expectation::Scan { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            client: KvClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> KvClient {
        self.client.clone()
    }

    pub fn expect_get(&mut self, key: &str) -> ExpectationBuilder<Option<String>> {
        let key = key.to_string();
        self.builder(move |response| Expectation::Get { key, response })
    }

    pub fn expect_set(&mut self, key: &str) -> ExpectationBuilder<()> {
        let key = key.to_string();
        self.builder(move |response| Expectation::Set { key, response })
    }

    pub fn expect_hset(&mut self, key: &str) -> ExpectationBuilder<u64> {
        let key = key.to_string();
        self.builder(move |response| Expectation::HSet { key, response })
    }

    pub fn expect_hgetall(&mut self, key: &str) -> ExpectationBuilder<HashMap<String, String>> {
        let key = key.to_string();
        self.builder(move |response| Expectation::HGetAll { key, response })
    }

    pub fn expect_del(&mut self) -> ExpectationBuilder<u64> {
        self.builder(|response| Expectation::Del { response })
    }

    pub fn expect_incr(&mut self, key: &str) -> ExpectationBuilder<i64> {
        let key = key.to_string();
        self.builder(move |response| Expectation::Incr { key, response })
    }

    pub fn expect_scan(&mut self) -> ExpectationBuilder<(Vec<String>, u64)> {
        self.builder(|response| Expectation::Scan { response })
    }

    fn builder<T>(
        &self,
        wrap: impl FnOnce(Result<T, KvError>) -> Expectation + Send + 'static,
    ) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            wrap: Box::new(wrap),
            expectations: self.expectations.clone(),
        }
    }

    /// Number of expectations not yet consumed.
    pub fn remaining(&self) -> usize {
        self.expectations.lock().unwrap().len()
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let left = self.remaining();
        if left != 0 {
            panic!("Not all expectations were met. {left} remaining");
        }
    }
}

/// Completes an expectation with the reply the mock should give.
pub struct ExpectationBuilder<T> {
    wrap: Box<dyn FnOnce(Result<T, KvError>) -> Expectation + Send>,
    expectations: Queue,
}

impl<T> ExpectationBuilder<T> {
    pub fn return_ok(self, value: T) {
        let expectation = (self.wrap)(Ok(value));
        self.expectations.lock().unwrap().push_back(expectation);
    }

    pub fn return_err(self, error: KvError) {
        let expectation = (self.wrap)(Err(error));
        self.expectations.lock().unwrap().push_back(expectation);
    }
}
