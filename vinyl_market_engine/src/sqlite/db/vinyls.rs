use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{NewVinyl, Rating, Vinyl};

pub async fn fetch_vinyl(vinyl_id: i64, conn: &mut SqliteConnection) -> Result<Option<Vinyl>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM vinyl WHERE id = $1").bind(vinyl_id).fetch_optional(conn).await
}

pub async fn vinyl_exists(vinyl_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM vinyl WHERE id = $1").bind(vinyl_id).fetch_optional(conn).await?;
    Ok(found.is_some())
}

/// Touches the vinyl row so that the calling transaction holds the write lock from here on. Returns `false` if there
/// is no such vinyl.
pub async fn lock_vinyl(vinyl_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE vinyl SET updated_at = updated_at WHERE id = $1")
        .bind(vinyl_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_vinyl(vinyl: NewVinyl, conn: &mut SqliteConnection) -> Result<Vinyl, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO vinyl (name, author_name, description, image, price, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(vinyl.name)
    .bind(vinyl.author_name)
    .bind(vinyl.description)
    .bind(vinyl.image)
    .bind(vinyl.price.value())
    .bind(vinyl.owner_id)
    .fetch_one(conn)
    .await
}

/// Recomputes the vinyl's average rating from its live reviews and stores it. A vinyl with no reviews gets a rating
/// of zero.
///
/// Call this with the same transaction as the review write that made it necessary.
pub async fn update_average_rating(vinyl_id: i64, conn: &mut SqliteConnection) -> Result<Rating, sqlx::Error> {
    let mean: f64 =
        sqlx::query_scalar("SELECT COALESCE(AVG(score), 0.0) FROM review WHERE vinyl_id = $1 AND deleted_at IS NULL")
            .bind(vinyl_id)
            .fetch_one(&mut *conn)
            .await?;
    let rating = Rating::from_mean(mean);
    sqlx::query("UPDATE vinyl SET average_rating = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(rating.hundredths())
        .bind(vinyl_id)
        .execute(conn)
        .await?;
    trace!("🗃️ Average rating for vinyl #{vinyl_id} set to {rating}");
    Ok(rating)
}
