use thiserror::Error;

use crate::{
    db_types::{NewReview, Page, Pagination, Rating, Review},
    traits::Requester,
};

#[derive(Debug, Clone, Error)]
pub enum ReviewError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid review: {}", .0.join(", "))]
    ValidationError(Vec<String>),
    #[error("Vinyl with ID {0} not found")]
    VinylNotFound(i64),
    #[error("User has already reviewed this vinyl")]
    AlreadyReviewed,
    #[error("Review with ID {0} not found")]
    ReviewNotFound(i64),
    #[error("You can only delete your own reviews")]
    Forbidden,
}

impl From<sqlx::Error> for ReviewError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => ReviewError::AlreadyReviewed,
            e => ReviewError::DatabaseError(e.to_string()),
        }
    }
}

/// Review storage. Every write recomputes the vinyl's average rating inside the same transaction as the write itself,
/// so the stored rating never disagrees with the committed reviews.
#[allow(async_fn_in_trait)]
pub trait ReviewManagement {
    /// Inserts a review and refreshes the average rating of the vinyl.
    ///
    /// Fails with [`ReviewError::VinylNotFound`] if the vinyl does not exist and with [`ReviewError::AlreadyReviewed`]
    /// if the user already has a live review for it. Nothing is persisted on any error.
    async fn create_review(
        &self,
        user_id: i64,
        vinyl_id: i64,
        review: NewReview,
    ) -> Result<(Review, Rating), ReviewError>;

    /// Deletes a review and refreshes the average rating of its vinyl.
    ///
    /// Only the author, or an admin, may delete a review. The returned rating is `None` if the vinyl no longer
    /// exists.
    async fn delete_review(
        &self,
        review_id: i64,
        requester: &Requester,
    ) -> Result<(Review, Option<Rating>), ReviewError>;

    async fn fetch_review(&self, review_id: i64) -> Result<Option<Review>, ReviewError>;

    /// Live reviews for the vinyl, newest first.
    async fn fetch_reviews_for_vinyl(
        &self,
        vinyl_id: i64,
        pagination: &Pagination,
    ) -> Result<Page<Review>, ReviewError>;
}
