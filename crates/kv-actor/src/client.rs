//! # Engine Client
//!
//! [`KvClient`] is the handle the rest of the system holds. It only wraps an mpsc sender,
//! so cloning it into every request handler is cheap. When the last clone is dropped the
//! actor's loop ends.

use crate::error::KvError;
use crate::message::KvRequest;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

/// A handle to a running [`KvActor`](crate::KvActor).
#[derive(Clone, Debug)]
pub struct KvClient {
    sender: mpsc::Sender<KvRequest>,
}

impl KvClient {
    pub fn new(sender: mpsc::Sender<KvRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, KvError>>) -> KvRequest,
    ) -> Result<T, KvError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| KvError::EngineClosed)?;
        response.await.map_err(|_| KvError::EngineDropped)?
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let key = key.to_string();
        self.request(|respond_to| KvRequest::Get { key, respond_to })
            .await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.request(|respond_to| KvRequest::Set {
            key,
            value,
            respond_to,
        })
        .await
    }

    pub async fn hset(&self, key: &str, fields: HashMap<String, String>) -> Result<u64, KvError> {
        let key = key.to_string();
        self.request(|respond_to| KvRequest::HSet {
            key,
            fields,
            respond_to,
        })
        .await
    }

    pub async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        let key = key.to_string();
        self.request(|respond_to| KvRequest::HGetAll { key, respond_to })
            .await
    }

    pub async fn del(&self, keys: Vec<String>) -> Result<u64, KvError> {
        self.request(|respond_to| KvRequest::Del { keys, respond_to })
            .await
    }

    pub async fn incr(&self, key: &str) -> Result<i64, KvError> {
        let key = key.to_string();
        self.request(|respond_to| KvRequest::Incr { key, respond_to })
            .await
    }

    pub async fn scan(
        &self,
        cursor: u64,
        pattern: Option<&str>,
        count: usize,
    ) -> Result<(Vec<String>, u64), KvError> {
        let pattern = pattern.map(str::to_string);
        self.request(|respond_to| KvRequest::Scan {
            cursor,
            pattern,
            count,
            respond_to,
        })
        .await
    }
}
