//! # Persistence
//!
//! A thin mapping layer between domain records and the key-value engine. Every record type
//! implements [`Record`], which says where it lives and how it flattens into a hash; a single
//! generic [`Repository`] then provides the same scan/get/set/delete surface for all of them.
//!
//! | Record | Key | Hash fields |
//! |--------|-----|-------------|
//! | [`Item`] | `<id>` | `name`, `desc`, `qty` |
//! | [`Order`] | `order:<id>` | `<item id>` → `<qty>` |
//!
//! Writes go out as one `HSET` carrying the full field map, which the engine applies
//! atomically. Reads of a missing key come back as `None`, never as an error.

pub mod items;
pub mod orders;
pub mod sequence;

pub use items::{BatchFailure, BatchSummary, ItemStore};
pub use orders::OrderStore;
pub use sequence::{SequenceAllocator, SEQUENCE_KEY};

use crate::codec::CodecError;
use crate::model::{Item, Order, ParseError};
use kv_actor::{KvEngine, KvError};
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::{debug, info, instrument, warn};

/// Errors raised by a [`Repository`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("engine error: {0}")]
    Engine(#[from] KvError),
    #[error("malformed record: {0}")]
    Parse(#[from] ParseError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("invalid record: {0}")]
    Invalid(String),
}

/// A domain value that can be stored as one engine hash.
pub trait Record: Sized + Send + Sync {
    /// Key prefix, joined to the id with `:`. Empty means no prefix.
    const NAMESPACE: &'static str;

    fn record_id(&self) -> String;

    fn to_hash(&self) -> HashMap<String, String>;

    fn from_hash(id: &str, fields: HashMap<String, String>) -> Result<Self, ParseError>;

    /// Checked before every write.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Record for Item {
    const NAMESPACE: &'static str = "";

    fn record_id(&self) -> String {
        self.id.clone()
    }

    fn to_hash(&self) -> HashMap<String, String> {
        self.to_fields()
    }

    fn from_hash(id: &str, fields: HashMap<String, String>) -> Result<Self, ParseError> {
        Item::from_fields(id, fields)
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("item needs a name".to_string());
        }
        if !self.has_consistent_id() {
            return Err(format!(
                "id {:?} does not match name {:?}",
                self.id, self.name
            ));
        }
        Ok(())
    }
}

impl Record for Order {
    const NAMESPACE: &'static str = "order";

    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn to_hash(&self) -> HashMap<String, String> {
        let (_, fields) = self.to_storage();
        fields
            .into_iter()
            .map(|(item_id, qty)| (item_id, qty.to_string()))
            .collect()
    }

    fn from_hash(id: &str, fields: HashMap<String, String>) -> Result<Self, ParseError> {
        let fields = fields
            .into_iter()
            .map(|(field, value)| match value.parse::<u64>() {
                Ok(qty) => Ok((field, qty)),
                Err(_) => Err(ParseError::Quantity { field, value }),
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        Order::from_storage(id, fields)
    }
}

/// Generic record storage over any [`KvEngine`].
#[derive(Debug, Clone)]
pub struct Repository<R, E> {
    engine: E,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record, E: KvEngine> Repository<R, E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            _record: PhantomData,
        }
    }

    fn key(id: &str) -> String {
        if R::NAMESPACE.is_empty() {
            id.to_string()
        } else {
            format!("{}:{}", R::NAMESPACE, id)
        }
    }

    fn pattern() -> Option<String> {
        (!R::NAMESPACE.is_empty()).then(|| format!("{}:*", R::NAMESPACE))
    }

    fn strip(key: &str) -> &str {
        if R::NAMESPACE.is_empty() {
            return key;
        }
        key.strip_prefix(R::NAMESPACE)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(key)
    }

    /// Ids of every stored record, in engine scan order.
    #[instrument(skip(self), fields(namespace = R::NAMESPACE))]
    pub async fn scan_ids(&self) -> Result<Vec<String>, StoreError> {
        let keys = self.engine.scan_all(Self::pattern().as_deref()).await?;
        debug!(found = keys.len(), "Scanned");
        Ok(keys.iter().map(|k| Self::strip(k).to_string()).collect())
    }

    #[instrument(skip(self), fields(namespace = R::NAMESPACE))]
    pub async fn get(&self, id: &str) -> Result<Option<R>, StoreError> {
        let fields = self.engine.hgetall(&Self::key(id)).await?;
        if fields.is_empty() {
            debug!("Not found");
            return Ok(None);
        }
        Ok(Some(R::from_hash(id, fields)?))
    }

    /// Reads every record. Records deleted between the scan and the read are skipped.
    pub async fn get_all(&self) -> Result<Vec<R>, StoreError> {
        let mut records = Vec::new();
        for id in self.scan_ids().await? {
            if let Some(record) = self.get(&id).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Validates, then writes every field in one `HSET`.
    #[instrument(skip_all, fields(namespace = R::NAMESPACE, id = %record.record_id()))]
    pub async fn set(&self, record: &R) -> Result<(), StoreError> {
        if let Err(reason) = record.validate() {
            warn!(%reason, "Rejected");
            return Err(StoreError::Invalid(reason));
        }
        let key = Self::key(&record.record_id());
        self.engine.hset(&key, record.to_hash()).await?;
        info!(%key, "Stored");
        Ok(())
    }

    /// Deleting a missing record is not an error.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.delete_many(&[id.to_string()]).await.map(|_| ())
    }

    #[instrument(skip(self), fields(namespace = R::NAMESPACE))]
    pub async fn delete_many(&self, ids: &[String]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let keys = ids.iter().map(|id| Self::key(id)).collect();
        let removed = self.engine.del(keys).await?;
        info!(removed, "Deleted");
        Ok(removed)
    }
}
