use crate::model::OrderId;
use kv_actor::{KvClient, KvEngine, KvError};
use tracing::{debug, instrument};

/// Key of the global order counter.
pub const SEQUENCE_KEY: &str = "nextID";

/// Hands out order ids from a single engine counter.
///
/// Each call is one `INCR`, so ids are unique and strictly increasing across every task and
/// process sharing the engine. The first id ever allocated is `1`. An id is consumed even if
/// the order it was meant for is never stored.
#[derive(Debug, Clone)]
pub struct SequenceAllocator<E = KvClient> {
    engine: E,
    key: String,
}

impl<E: KvEngine> SequenceAllocator<E> {
    pub fn new(engine: E) -> Self {
        Self::with_key(engine, SEQUENCE_KEY)
    }

    pub fn with_key(engine: E, key: impl Into<String>) -> Self {
        Self {
            engine,
            key: key.into(),
        }
    }

    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn next(&self) -> Result<OrderId, KvError> {
        let id = OrderId(self.engine.incr(&self.key).await?);
        debug!(%id, "Allocated");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kv_actor::KvActor;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_first_id_is_one() {
        let (actor, client) = KvActor::new(8);
        tokio::spawn(actor.run());
        let seq = SequenceAllocator::new(client);

        assert_eq!(seq.next().await, Ok(OrderId(1)));
        assert_eq!(seq.next().await, Ok(OrderId(2)));
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_unique() {
        let (actor, client) = KvActor::new(64);
        tokio::spawn(actor.run());
        let seq = SequenceAllocator::new(client);

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let seq = seq.clone();
                tokio::spawn(async move { seq.next().await })
            })
            .collect();

        let mut ids = HashSet::new();
        for task in tasks {
            assert!(ids.insert(task.await.unwrap().unwrap()));
        }
        assert_eq!(ids.len(), 50);
        assert_eq!(ids.iter().max(), Some(&OrderId(50)));
    }
}
