//! Best-effort writes to the persistent system log.
use log::*;

use crate::{db_types::LogLevel, traits::SystemLogManagement};

/// Appends an entry to the system log. A failure to write is logged and otherwise ignored; it never fails the
/// operation being audited.
pub async fn record<B: SystemLogManagement>(db: &B, level: LogLevel, message: &str) {
    if let Err(e) = db.create_log(level, message).await {
        warn!("🗃️ Could not write to the system log ({level}: {message}). {e}");
    }
}
