//! # Engine Actor
//!
//! The server half of the engine. [`KvActor`] owns the keyspace and the receiving end of
//! the command channel, and answers every [`KvRequest`] in arrival order.

use crate::client::KvClient;
use crate::error::KvError;
use crate::message::KvRequest;
use crate::pattern::glob_match;
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default page size for `SCAN` when the caller passes `0`.
pub const DEFAULT_SCAN_COUNT: usize = 10;

/// The actor that owns one keyspace.
///
/// **Concurrency model**: clients can live on any number of tasks, but the actor handles
/// exactly one request at a time. A single `HSET` carrying ten fields therefore can never be
/// observed half-applied, and two concurrent `INCR`s can never return the same number.
///
/// Keys are kept in a `BTreeMap` so that `SCAN` cursors are stable offsets into a sorted
/// key order. A cursor is the number of keys already visited; if keys are inserted or
/// removed between pages, a key may be returned twice or skipped, which is the same
/// guarantee Redis gives.
///
/// ```rust
/// use kv_actor::KvActor;
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = KvActor::new(16);
///     tokio::spawn(actor.run());
///
///     client.set("greeting", "hello").await.unwrap();
///     assert_eq!(client.get("greeting").await.unwrap().as_deref(), Some("hello"));
/// }
/// ```
pub struct KvActor {
    name: String,
    receiver: mpsc::Receiver<KvRequest>,
    keyspace: BTreeMap<String, Value>,
}

impl KvActor {
    /// Creates an actor and the first client connected to it.
    ///
    /// `buffer_size` is the capacity of the command channel. When it is full, client calls
    /// wait for space.
    pub fn new(buffer_size: usize) -> (Self, KvClient) {
        Self::named("kv", buffer_size)
    }

    /// Like [`KvActor::new`], with a name that shows up in the actor's log lines.
    pub fn named(name: impl Into<String>, buffer_size: usize) -> (Self, KvClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            name: name.into(),
            receiver,
            keyspace: BTreeMap::new(),
        };
        (actor, KvClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self) {
        let engine = self.name.clone();
        info!(%engine, "Engine started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                KvRequest::Get { key, respond_to } => {
                    let result = self.get(&key);
                    debug!(%engine, %key, found = matches!(result, Ok(Some(_))), "Get");
                    let _ = respond_to.send(result);
                }
                KvRequest::Set {
                    key,
                    value,
                    respond_to,
                } => {
                    debug!(%engine, %key, "Set");
                    self.keyspace.insert(key, Value::Str(value));
                    let _ = respond_to.send(Ok(()));
                }
                KvRequest::HSet {
                    key,
                    fields,
                    respond_to,
                } => {
                    let result = self.hset(&key, fields);
                    match &result {
                        Ok(added) => debug!(%engine, %key, added, "HSet"),
                        Err(e) => warn!(%engine, %key, error = %e, "HSet failed"),
                    }
                    let _ = respond_to.send(result);
                }
                KvRequest::HGetAll { key, respond_to } => {
                    let result = self.hgetall(&key);
                    debug!(%engine, %key, "HGetAll");
                    let _ = respond_to.send(result);
                }
                KvRequest::Del { keys, respond_to } => {
                    let removed = keys
                        .iter()
                        .filter(|key| self.keyspace.remove(key.as_str()).is_some())
                        .count() as u64;
                    info!(%engine, removed, size = self.keyspace.len(), "Deleted");
                    let _ = respond_to.send(Ok(removed));
                }
                KvRequest::Incr { key, respond_to } => {
                    let result = self.incr(&key);
                    match &result {
                        Ok(value) => debug!(%engine, %key, value, "Incr"),
                        Err(e) => warn!(%engine, %key, error = %e, "Incr failed"),
                    }
                    let _ = respond_to.send(result);
                }
                KvRequest::Scan {
                    cursor,
                    pattern,
                    count,
                    respond_to,
                } => {
                    let (keys, next) = self.scan(cursor, pattern.as_deref(), count);
                    debug!(%engine, cursor, next, returned = keys.len(), "Scan");
                    let _ = respond_to.send(Ok((keys, next)));
                }
            }
        }

        info!(%engine, size = self.keyspace.len(), "Shutdown");
    }

    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        match self.keyspace.get(key) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(Value::Hash(_)) => Err(KvError::WrongType(key.to_string())),
        }
    }

    fn hset(&mut self, key: &str, fields: HashMap<String, String>) -> Result<u64, KvError> {
        if fields.is_empty() {
            return Ok(0);
        }
        let entry = self
            .keyspace
            .entry(key.to_string())
            .or_insert_with(|| Value::Hash(HashMap::new()));
        match entry {
            Value::Hash(hash) => {
                let mut added = 0;
                for (field, value) in fields {
                    if hash.insert(field, value).is_none() {
                        added += 1;
                    }
                }
                Ok(added)
            }
            Value::Str(_) => Err(KvError::WrongType(key.to_string())),
        }
    }

    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        match self.keyspace.get(key) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(hash)) => Ok(hash.clone()),
            Some(Value::Str(_)) => Err(KvError::WrongType(key.to_string())),
        }
    }

    fn incr(&mut self, key: &str) -> Result<i64, KvError> {
        let current = match self.keyspace.get(key) {
            None => 0,
            Some(Value::Str(s)) => s
                .parse::<i64>()
                .map_err(|_| KvError::NotAnInteger(key.to_string()))?,
            Some(Value::Hash(_)) => return Err(KvError::WrongType(key.to_string())),
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| KvError::Overflow(key.to_string()))?;
        self.keyspace
            .insert(key.to_string(), Value::Str(next.to_string()));
        Ok(next)
    }

    fn scan(&self, cursor: u64, pattern: Option<&str>, count: usize) -> (Vec<String>, u64) {
        let count = if count == 0 { DEFAULT_SCAN_COUNT } else { count };
        let start = cursor as usize;

        let keys: Vec<String> = self
            .keyspace
            .keys()
            .skip(start)
            .take(count)
            .filter(|key| pattern.map_or(true, |p| glob_match(p, key)))
            .cloned()
            .collect();

        let visited = start.saturating_add(count);
        let next = if visited >= self.keyspace.len() {
            0
        } else {
            visited as u64
        };
        (keys, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> KvActor {
        KvActor::new(1).0
    }

    #[test]
    fn test_incr_starts_at_one() {
        let mut kv = actor();
        assert_eq!(kv.incr("nextID"), Ok(1));
        assert_eq!(kv.incr("nextID"), Ok(2));
    }

    #[test]
    fn test_incr_rejects_non_integer() {
        let mut kv = actor();
        kv.keyspace
            .insert("name".into(), Value::Str("widget".into()));
        assert_eq!(kv.incr("name"), Err(KvError::NotAnInteger("name".into())));
    }

    #[test]
    fn test_incr_overflow() {
        let mut kv = actor();
        kv.keyspace
            .insert("n".into(), Value::Str(i64::MAX.to_string()));
        assert_eq!(kv.incr("n"), Err(KvError::Overflow("n".into())));
    }

    #[test]
    fn test_empty_hset_does_not_create_key() {
        let mut kv = actor();
        assert_eq!(kv.hset("order:1", HashMap::new()), Ok(0));
        assert!(kv.keyspace.is_empty());
    }

    #[test]
    fn test_scan_pages_cover_keyspace() {
        let mut kv = actor();
        for i in 0..25 {
            kv.keyspace
                .insert(format!("order:{i}"), Value::Str(String::new()));
        }
        kv.keyspace.insert("nextID".into(), Value::Str("25".into()));

        let mut cursor = 0;
        let mut seen = Vec::new();
        loop {
            let (keys, next) = kv.scan(cursor, Some("order:*"), 10);
            seen.extend(keys);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        assert_eq!(seen.len(), 25);
        assert!(seen.iter().all(|k| k.starts_with("order:")));
    }
}
