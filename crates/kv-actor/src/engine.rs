use crate::{KvClient, KvError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// The storage primitives the services are written against.
///
/// [`KvClient`] is the in-process implementation and [`RedisEngine`](crate::RedisEngine) the
/// networked one. Both provide the seven primitives; [`scan_all`](KvEngine::scan_all) comes
/// for free.
///
/// # Example
///
/// ```rust
/// use kv_actor::{KvActor, KvEngine};
///
/// async fn count_orders(engine: &impl KvEngine) -> usize {
///     engine.scan_all(Some("order:*")).await.map(|k| k.len()).unwrap_or(0)
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = KvActor::new(8);
///     tokio::spawn(actor.run());
///     client.set("order:1", "x").await.unwrap();
///     assert_eq!(count_orders(&client).await, 1);
/// }
/// ```
#[async_trait]
pub trait KvEngine: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Writes every field in one atomic step.
    async fn hset(&self, key: &str, fields: HashMap<String, String>) -> Result<u64, KvError>;

    /// Missing keys read as an empty map.
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError>;

    async fn del(&self, keys: Vec<String>) -> Result<u64, KvError>;

    async fn incr(&self, key: &str) -> Result<i64, KvError>;

    async fn scan(
        &self,
        cursor: u64,
        pattern: Option<&str>,
        count: usize,
    ) -> Result<(Vec<String>, u64), KvError>;

    /// Drives a `SCAN` cursor to completion and collects every matching key once, in the
    /// order first seen. A cursor may report a key on more than one page.
    #[tracing::instrument(skip(self))]
    async fn scan_all(&self, pattern: Option<&str>) -> Result<Vec<String>, KvError> {
        let mut keys = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = 0;
        loop {
            let (page, next) = self.scan(cursor, pattern, 10).await?;
            keys.extend(page.into_iter().filter(|key| seen.insert(key.clone())));
            if next == 0 {
                break;
            }
            cursor = next;
        }
        tracing::debug!(found = keys.len(), "Scan complete");
        Ok(keys)
    }
}

#[async_trait]
impl KvEngine for KvClient {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        KvClient::get(self, key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        KvClient::set(self, key, value).await
    }

    async fn hset(&self, key: &str, fields: HashMap<String, String>) -> Result<u64, KvError> {
        KvClient::hset(self, key, fields).await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        KvClient::hgetall(self, key).await
    }

    async fn del(&self, keys: Vec<String>) -> Result<u64, KvError> {
        KvClient::del(self, keys).await
    }

    async fn incr(&self, key: &str) -> Result<i64, KvError> {
        KvClient::incr(self, key).await
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: Option<&str>,
        count: usize,
    ) -> Result<(Vec<String>, u64), KvError> {
        KvClient::scan(self, cursor, pattern, count).await
    }
}
