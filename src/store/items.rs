use super::{Repository, StoreError};
use crate::model::Item;
use kv_actor::{KvClient, KvEngine};
use tracing::{debug, info, instrument};

/// Catalog entry storage.
pub type ItemStore<E = KvClient> = Repository<Item, E>;

/// One entry of a batch write that was not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub id: String,
    pub reason: String,
}

/// Per-entry outcome of [`ItemStore::set_many`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub created: Vec<Item>,
    pub failed: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn all_created(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn all_failed(&self) -> bool {
        self.created.is_empty()
    }

    /// A one-line description listing created and failed ids.
    pub fn message(&self) -> String {
        let created = self
            .created
            .iter()
            .map(|i| i.id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let failed = self
            .failed
            .iter()
            .map(|f| format!("{} ({})", f.id, f.reason))
            .collect::<Vec<_>>()
            .join(", ");

        match (self.created.is_empty(), self.failed.is_empty()) {
            (_, true) => format!("items {created} created"),
            (true, false) => format!("unable to create items: {failed}"),
            (false, false) => format!("items {created} created but some failed: {failed}"),
        }
    }
}

impl<E: KvEngine> Repository<Item, E> {
    /// Stores a batch of entries, recording an outcome for each instead of stopping at the
    /// first failure.
    ///
    /// Every entry gets its id derived from its name first. Without `overwrite`, an entry
    /// that already exists is reported as failed and left untouched. Engine errors while
    /// checking for existence abort the whole batch; errors while writing one entry only
    /// fail that entry.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn set_many(
        &self,
        items: Vec<Item>,
        overwrite: bool,
    ) -> Result<BatchSummary, StoreError> {
        let mut summary = BatchSummary::default();

        for mut item in items {
            item.assign_id()?;

            if !overwrite && self.get(&item.id).await?.is_some() {
                debug!(id = %item.id, "Already exists");
                summary.failed.push(BatchFailure {
                    id: item.id,
                    reason: "already exists".to_string(),
                });
                continue;
            }

            match self.set(&item).await {
                Ok(()) => summary.created.push(item),
                Err(e) => summary.failed.push(BatchFailure {
                    id: item.id,
                    reason: e.to_string(),
                }),
            }
        }

        info!(
            created = summary.created.len(),
            failed = summary.failed.len(),
            "Batch stored"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kv_actor::mock::MockEngine;
    use kv_actor::{KvActor, KvError};

    fn item(name: &str, qty: u64) -> Item {
        Item {
            id: String::new(),
            name: name.to_string(),
            desc: String::new(),
            qty,
        }
    }

    #[tokio::test]
    async fn test_create_then_conflict() {
        let (actor, client) = KvActor::new(16);
        tokio::spawn(actor.run());
        let store = ItemStore::new(client);

        let first = store
            .set_many(vec![item("Widget", 5), item("gizmo", 2)], false)
            .await
            .unwrap();
        assert!(first.all_created());
        assert_eq!(first.created.len(), 2);

        let second = store
            .set_many(vec![item("widget", 9), item("bolt", 1)], false)
            .await
            .unwrap();
        assert_eq!(second.created.len(), 1);
        assert_eq!(second.failed.len(), 1);
        assert!(second.message().contains("created but some failed"));

        let widget_id = crate::codec::encode("widget").unwrap();
        assert_eq!(store.get(&widget_id).await.unwrap().unwrap().qty, 5);

        let third = store
            .set_many(vec![item("widget", 9)], true)
            .await
            .unwrap();
        assert!(third.all_created());
        assert_eq!(store.get(&widget_id).await.unwrap().unwrap().qty, 9);
    }

    #[tokio::test]
    async fn test_write_failure_is_per_entry() {
        let widget = Item::new("widget", "", 1).unwrap();
        let mut mock = MockEngine::new();
        mock.expect_hset(&widget.id)
            .return_err(KvError::Unavailable("write refused".into()));

        let store = ItemStore::new(mock.client());
        let summary = store.set_many(vec![item("widget", 1)], true).await.unwrap();

        assert!(summary.all_failed());
        assert_eq!(summary.failed[0].id, widget.id);
        assert!(summary.message().starts_with("unable to create items"));
        mock.verify();
    }
}
