use cucumber::{then, when};
use vinyl_market_engine::{
    db_types::{NewReview, Pagination},
    traits::{CatalogManagement, Requester, ReviewError},
};

use crate::cucumber::RatingsWorld;

#[when(expr = "{word} reviews {string} with {int} stars and the comment {string}")]
async fn submit_review(world: &mut RatingsWorld, user: String, vinyl: String, score: i64, comment: String) {
    let user_id = world.user_id(&user);
    let vinyl_id = world.vinyl_id(&vinyl);
    let result = world.system().api.create_review(user_id, vinyl_id, NewReview::new(score, comment)).await;
    match result {
        Ok(review) => {
            world.reviews.insert((user, vinyl), review.id);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "{word} reviews {string} with {int} stars")]
async fn submit_default_review(world: &mut RatingsWorld, user: String, vinyl: String, score: i64) {
    let comment = format!("{score} stars. The pressing is clean and quiet.");
    submit_review(world, user, vinyl, score, comment).await;
}

#[when(expr = "{word} deletes the review {word} wrote for {string}")]
async fn delete_review(world: &mut RatingsWorld, deleter: String, author: String, vinyl: String) {
    let review_id = *world.reviews.get(&(author, vinyl)).expect("No such review");
    let user_id = world.user_id(&deleter);
    let user = world.system().db.fetch_user(user_id).await.expect("Error fetching user").expect("User exists");
    let requester = Requester::new(user.id, user.role);
    match world.system().api.remove_review(review_id, &requester).await {
        Ok(()) => world.last_error = None,
        Err(e) => world.last_error = Some(e),
    }
}

#[then(expr = "the average rating of {string} is {float}")]
async fn check_rating(world: &mut RatingsWorld, vinyl: String, expected: f64) {
    let vinyl_id = world.vinyl_id(&vinyl);
    let vinyl = world.system().db.fetch_vinyl(vinyl_id).await.expect("Error fetching vinyl").expect("Vinyl exists");
    let expected = (expected * 100.0).round() as i64;
    assert_eq!(vinyl.average_rating.hundredths(), expected, "Average rating is {}", vinyl.average_rating);
}

#[then(expr = "{string} has {int} review(s)")]
async fn check_review_count(world: &mut RatingsWorld, vinyl: String, count: i64) {
    let vinyl_id = world.vinyl_id(&vinyl);
    let page =
        world.system().api.reviews_for_vinyl(vinyl_id, Pagination::default()).await.expect("Error fetching reviews");
    assert_eq!(page.total, count);
}

#[then("the review is rejected as a duplicate")]
async fn check_duplicate(world: &mut RatingsWorld) {
    assert!(matches!(world.last_error, Some(ReviewError::AlreadyReviewed)), "Got {:?}", world.last_error);
}

#[then("the review is rejected as invalid")]
async fn check_invalid(world: &mut RatingsWorld) {
    assert!(matches!(world.last_error, Some(ReviewError::ValidationError(_))), "Got {:?}", world.last_error);
}

#[then("the deletion is forbidden")]
async fn check_forbidden(world: &mut RatingsWorld) {
    assert!(matches!(world.last_error, Some(ReviewError::Forbidden)), "Got {:?}", world.last_error);
}
