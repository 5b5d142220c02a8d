use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{LogLevel, NewReview, Page, Pagination, Review},
    market_api::audit,
    traits::{Requester, ReviewError, ReviewManagement, SystemLogManagement},
};

/// `ReviewApi` handles review submissions and removals, keeping each vinyl's average rating up to date.
pub struct ReviewApi<B> {
    db: B,
}

impl<B> Debug for ReviewApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReviewApi")
    }
}

impl<B> ReviewApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ReviewApi<B>
where B: ReviewManagement + SystemLogManagement
{
    /// Submits a review on behalf of `user_id`.
    ///
    /// The review is validated before anything touches the database. The insert and the rating update share a
    /// transaction: either both persist or neither does.
    pub async fn create_review(&self, user_id: i64, vinyl_id: i64, review: NewReview) -> Result<Review, ReviewError> {
        review.validate().map_err(ReviewError::ValidationError)?;
        let (review, rating) = self.db.create_review(user_id, vinyl_id, review).await.map_err(|e| {
            debug!("⭐️ Review by user #{user_id} for vinyl #{vinyl_id} was not stored. {e}");
            e
        })?;
        info!("⭐️ User #{user_id} reviewed vinyl #{vinyl_id} ({}/5). Average rating is now {rating}", review.score);
        let message = format!("User with ID:{user_id} created review for Vinyl ID:{vinyl_id}");
        audit::record(&self.db, LogLevel::Info, &message).await;
        let message = format!("Average rating for vinyl {vinyl_id} updated to {rating}");
        audit::record(&self.db, LogLevel::Info, &message).await;
        Ok(review)
    }

    /// Deletes a review. Only its author or an admin may do so.
    pub async fn remove_review(&self, review_id: i64, requester: &Requester) -> Result<(), ReviewError> {
        let (review, rating) = self.db.delete_review(review_id, requester).await?;
        let vinyl_id = review.vinyl_id;
        match rating {
            Some(rating) => info!("⭐️ Review #{review_id} removed. Vinyl #{vinyl_id} is now rated {rating}"),
            None => info!("⭐️ Review #{review_id} removed. Vinyl #{vinyl_id} no longer exists"),
        }
        let message = format!("User with ID:{} deleted review ID:{review_id} from Vinyl ID:{vinyl_id}", requester.user_id);
        audit::record(&self.db, LogLevel::Info, &message).await;
        Ok(())
    }

    pub async fn reviews_for_vinyl(&self, vinyl_id: i64, pagination: Pagination) -> Result<Page<Review>, ReviewError> {
        self.db.fetch_reviews_for_vinyl(vinyl_id, &pagination).await
    }
}
