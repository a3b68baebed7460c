use super::{Repository, StoreError};
use crate::model::{Order, OrderId};
use kv_actor::{KvClient, KvEngine};

/// Order storage under the `order:` namespace.
pub type OrderStore<E = KvClient> = Repository<Order, E>;

impl<E: KvEngine> Repository<Order, E> {
    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.get(&id.to_string()).await
    }

    /// Ids of every stored order, ascending.
    pub async fn order_ids(&self) -> Result<Vec<OrderId>, StoreError> {
        let mut ids = self
            .scan_ids()
            .await?
            .iter()
            .map(|id| id.parse::<OrderId>())
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort();
        Ok(ids)
    }
}
