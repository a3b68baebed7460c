//! # Redis Engine
//!
//! [`RedisEngine`] speaks the same seven primitives as the in-process actor, against a
//! Redis server. Every process pointed at the same server shares one keyspace, so `INCR`
//! counters survive restarts and stay unique across processes.
//!
//! The connection is a `redis` [`ConnectionManager`], which multiplexes commands over one
//! connection and reconnects after the server drops it. Cloning the engine clones the
//! manager, not the connection.

use crate::engine::KvEngine;
use crate::error::KvError;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Cmd, FromRedisValue, RedisError};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct RedisEngine {
    url: String,
    conn: ConnectionManager,
}

impl fmt::Debug for RedisEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisEngine").field("url", &self.url).finish()
    }
}

impl RedisEngine {
    /// Connects to `url` (`redis://host:port/db`).
    pub async fn connect(url: &str) -> Result<Self, KvError> {
        let client = redis::Client::open(url)
            .map_err(|e| KvError::Unavailable(format!("invalid redis url {url:?}: {e}")))?;
        let conn = client.get_connection_manager().await.map_err(|e| {
            warn!(%url, error = %e, "Redis connection failed");
            KvError::Unavailable(e.to_string())
        })?;
        info!(%url, "Connected to redis");
        Ok(Self {
            url: url.to_string(),
            conn,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn query<T: FromRedisValue>(&self, cmd: &Cmd, key: &str) -> Result<T, KvError> {
        let mut conn = self.conn.clone();
        let value: T = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| map_error(e, key))?;
        Ok(value)
    }
}

fn map_error(e: RedisError, key: &str) -> KvError {
    match e.code() {
        Some("WRONGTYPE") => KvError::WrongType(key.to_string()),
        Some("ERR") if e.to_string().contains("not an integer") => {
            KvError::NotAnInteger(key.to_string())
        }
        Some("ERR") if e.to_string().contains("overflow") => KvError::Overflow(key.to_string()),
        _ => KvError::Unavailable(e.to_string()),
    }
}

#[async_trait]
impl KvEngine for RedisEngine {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.query(redis::cmd("GET").arg(key), key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.query(redis::cmd("SET").arg(key).arg(value), key).await
    }

    async fn hset(&self, key: &str, fields: HashMap<String, String>) -> Result<u64, KvError> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in &fields {
            cmd.arg(field).arg(value);
        }
        let added: u64 = self.query(&cmd, key).await?;
        debug!(%key, added, "HSet");
        Ok(added)
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        self.query(redis::cmd("HGETALL").arg(key), key).await
    }

    async fn del(&self, keys: Vec<String>) -> Result<u64, KvError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let first = keys[0].clone();
        self.query(redis::cmd("DEL").arg(keys), &first).await
    }

    async fn incr(&self, key: &str) -> Result<i64, KvError> {
        self.query(redis::cmd("INCR").arg(key), key).await
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: Option<&str>,
        count: usize,
    ) -> Result<(Vec<String>, u64), KvError> {
        let mut cmd = redis::cmd("SCAN");
        cmd.arg(cursor);
        if let Some(pattern) = pattern {
            cmd.arg("MATCH").arg(pattern);
        }
        if count > 0 {
            cmd.arg("COUNT").arg(count);
        }
        let (next, keys): (u64, Vec<String>) = self.query(&cmd, pattern.unwrap_or("*")).await?;
        Ok((keys, next))
    }
}
