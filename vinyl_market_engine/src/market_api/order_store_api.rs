use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, OrderWithItems},
    traits::{InsertOrderResult, OrderManagement, OrderStoreError},
};

/// Read and write access to stored orders.
pub struct OrderStoreApi<B> {
    db: B,
}

impl<B> Debug for OrderStoreApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderStoreApi")
    }
}

impl<B> OrderStoreApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderStoreApi<B>
where B: OrderManagement
{
    /// See [`OrderManagement::create_order`].
    pub async fn create_order(&self, order: NewOrder) -> Result<InsertOrderResult, OrderStoreError> {
        let session_id = order.stripe_session_id.clone();
        let result = self.db.create_order(order).await?;
        trace!("🗃️ create_order for session {session_id}: {result:?}");
        Ok(result)
    }

    pub async fn find_by_session_id(&self, session_id: &str) -> Result<OrderWithItems, OrderStoreError> {
        self.db
            .fetch_order_by_session_id(session_id)
            .await?
            .ok_or_else(|| OrderStoreError::NotFound(session_id.to_string()))
    }

    pub async fn find_all(&self) -> Result<Vec<OrderWithItems>, OrderStoreError> {
        self.db.fetch_all_orders().await
    }
}
