use sqlx::SqliteConnection;

use crate::db_types::{NewReview, Pagination, Review};

pub async fn insert_review(
    user_id: i64,
    vinyl_id: i64,
    review: &NewReview,
    conn: &mut SqliteConnection,
) -> Result<Review, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO review (user_id, vinyl_id, score, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(vinyl_id)
    .bind(review.score)
    .bind(review.comment.trim())
    .fetch_one(conn)
    .await
}

pub async fn fetch_review(review_id: i64, conn: &mut SqliteConnection) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM review WHERE id = $1 AND deleted_at IS NULL")
        .bind(review_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_review_by_user_and_vinyl(
    user_id: i64,
    vinyl_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM review WHERE user_id = $1 AND vinyl_id = $2 AND deleted_at IS NULL")
        .bind(user_id)
        .bind(vinyl_id)
        .fetch_optional(conn)
        .await
}

/// Removes the review row, returning it. Returns `None` if there was nothing to delete.
pub async fn delete_review(review_id: i64, conn: &mut SqliteConnection) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as("DELETE FROM review WHERE id = $1 AND deleted_at IS NULL RETURNING *")
        .bind(review_id)
        .fetch_optional(conn)
        .await
}

/// One page of live reviews for the vinyl, newest first, together with the total number of live reviews.
pub async fn fetch_reviews_for_vinyl(
    vinyl_id: i64,
    pagination: &Pagination,
    conn: &mut SqliteConnection,
) -> Result<(Vec<Review>, i64), sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM review WHERE vinyl_id = $1 AND deleted_at IS NULL")
        .bind(vinyl_id)
        .fetch_one(&mut *conn)
        .await?;
    let reviews = sqlx::query_as(
        r#"
            SELECT * FROM review
            WHERE vinyl_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3;
        "#,
    )
    .bind(vinyl_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(conn)
    .await?;
    Ok((reviews, total))
}
