use sqlx::SqliteConnection;

use crate::db_types::{NewUser, User};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO users (first_name, last_name, email, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, email, role;
        "#,
    )
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.email)
    .bind(user.role)
    .fetch_one(conn)
    .await
}

pub async fn fetch_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT id, first_name, last_name, email, role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await
}
