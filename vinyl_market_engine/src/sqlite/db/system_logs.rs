use sqlx::SqliteConnection;

use crate::db_types::{LogLevel, Pagination, SystemLog};

pub async fn insert_log(level: LogLevel, message: &str, conn: &mut SqliteConnection) -> Result<SystemLog, sqlx::Error> {
    sqlx::query_as("INSERT INTO system_log (level, message) VALUES ($1, $2) RETURNING *")
        .bind(level)
        .bind(message)
        .fetch_one(conn)
        .await
}

pub async fn fetch_logs(
    pagination: &Pagination,
    conn: &mut SqliteConnection,
) -> Result<(Vec<SystemLog>, i64), sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM system_log").fetch_one(&mut *conn).await?;
    let logs = sqlx::query_as("SELECT * FROM system_log ORDER BY id DESC LIMIT $1 OFFSET $2")
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(conn)
        .await?;
    Ok((logs, total))
}
