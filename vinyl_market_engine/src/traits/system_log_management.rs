use thiserror::Error;

use crate::db_types::{LogLevel, Page, Pagination, SystemLog};

#[derive(Debug, Clone, Error)]
#[error("Could not access the system log: {0}")]
pub struct SystemLogError(pub String);

impl From<sqlx::Error> for SystemLogError {
    fn from(e: sqlx::Error) -> Self {
        SystemLogError(e.to_string())
    }
}

/// The persistent audit trail.
#[allow(async_fn_in_trait)]
pub trait SystemLogManagement {
    async fn create_log(&self, level: LogLevel, message: &str) -> Result<SystemLog, SystemLogError>;

    /// Log entries, newest first.
    async fn fetch_logs(&self, pagination: &Pagination) -> Result<Page<SystemLog>, SystemLogError>;
}
