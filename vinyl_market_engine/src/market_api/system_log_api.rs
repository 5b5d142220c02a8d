use std::fmt::Debug;

use crate::{
    db_types::{Page, Pagination, SystemLog},
    traits::{SystemLogError, SystemLogManagement},
};

/// Read access to the audit trail.
pub struct SystemLogApi<B> {
    db: B,
}

impl<B> Debug for SystemLogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SystemLogApi")
    }
}

impl<B> SystemLogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> SystemLogApi<B>
where B: SystemLogManagement
{
    /// Log entries, newest first.
    pub async fn fetch_logs(&self, pagination: Pagination) -> Result<Page<SystemLog>, SystemLogError> {
        self.db.fetch_logs(&pagination).await
    }
}
