use crate::{KvClient, KvEngine, KvError, RedisEngine};
use async_trait::async_trait;
use std::collections::HashMap;

/// Either engine, chosen at startup.
///
/// Services are generic over [`KvEngine`]; `Backend` lets a binary pick the concrete engine
/// from configuration without monomorphizing every router twice.
#[derive(Clone, Debug)]
pub enum Backend {
    /// An in-process [`KvActor`](crate::KvActor). Its keyspace lives as long as the actor.
    Local(KvClient),
    /// A Redis server shared by every process connected to it.
    Redis(RedisEngine),
}

impl Backend {
    pub fn kind(&self) -> &'static str {
        match self {
            Backend::Local(_) => "in-process",
            Backend::Redis(_) => "redis",
        }
    }
}

impl From<KvClient> for Backend {
    fn from(client: KvClient) -> Self {
        Backend::Local(client)
    }
}

impl From<RedisEngine> for Backend {
    fn from(engine: RedisEngine) -> Self {
        Backend::Redis(engine)
    }
}

macro_rules! delegate {
    ($self:ident, $engine:ident => $call:expr) => {
        match $self {
            Backend::Local($engine) => $call,
            Backend::Redis($engine) => $call,
        }
    };
}

#[async_trait]
impl KvEngine for Backend {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        delegate!(self, e => KvEngine::get(e, key).await)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        delegate!(self, e => KvEngine::set(e, key, value).await)
    }

    async fn hset(&self, key: &str, fields: HashMap<String, String>) -> Result<u64, KvError> {
        delegate!(self, e => KvEngine::hset(e, key, fields).await)
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        delegate!(self, e => KvEngine::hgetall(e, key).await)
    }

    async fn del(&self, keys: Vec<String>) -> Result<u64, KvError> {
        delegate!(self, e => KvEngine::del(e, keys).await)
    }

    async fn incr(&self, key: &str) -> Result<i64, KvError> {
        delegate!(self, e => KvEngine::incr(e, key).await)
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: Option<&str>,
        count: usize,
    ) -> Result<(Vec<String>, u64), KvError> {
        delegate!(self, e => KvEngine::scan(e, cursor, pattern, count).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KvActor;

    #[tokio::test]
    async fn test_local_backend_delegates() {
        let (actor, client) = KvActor::new(8);
        tokio::spawn(actor.run());
        let backend = Backend::from(client.clone());
        assert_eq!(backend.kind(), "in-process");

        assert_eq!(backend.incr("nextID").await, Ok(1));
        backend
            .hset("order:1", HashMap::from([("abc".into(), "2".into())]))
            .await
            .unwrap();
        assert_eq!(client.hgetall("order:1").await.unwrap().len(), 1);
        assert_eq!(backend.scan_all(Some("order:*")).await.unwrap(), vec!["order:1"]);
        assert_eq!(backend.del(vec!["order:1".into()]).await, Ok(1));
    }
}
