use thiserror::Error;

use crate::db_types::{NewOrder, OrderWithItems};

/// The result of an idempotent order insert. Both variants carry the row id of the order for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOrderResult {
    Inserted(i64),
    AlreadyExists(i64),
}

impl InsertOrderResult {
    pub fn id(&self) -> i64 {
        match self {
            Self::Inserted(id) | Self::AlreadyExists(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order for session {0} not found")]
    NotFound(String),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}

/// Persistence of orders materialised from completed checkout sessions.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores the order and its items in a single transaction.
    ///
    /// Items without a catalog id are dropped before insertion. The order's `total_amount` is stored exactly as
    /// given, whether or not any items were dropped.
    ///
    /// If an order for the same checkout session already exists, nothing is written and
    /// [`InsertOrderResult::AlreadyExists`] is returned. This also holds when two deliveries race each other.
    async fn create_order(&self, order: NewOrder) -> Result<InsertOrderResult, OrderStoreError>;

    async fn fetch_order_by_session_id(&self, session_id: &str) -> Result<Option<OrderWithItems>, OrderStoreError>;

    /// All orders, oldest first, each with its items.
    async fn fetch_all_orders(&self) -> Result<Vec<OrderWithItems>, OrderStoreError>;
}
