use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use vinyl_market_engine::{
    db_types::{NewReview, Page, Rating, Review, Role},
    traits::ReviewError,
    ReviewApi,
};

use super::{
    helpers::{bearer, issue_token, send_request},
    mocks::MockMarketBackend,
};
use crate::routes::{CreateReviewRoute, DeleteReviewRoute, ReviewsForVinylRoute};

fn review(id: i64, user_id: i64, vinyl_id: i64, score: i64) -> Review {
    let at = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();
    Review {
        id,
        user_id,
        vinyl_id,
        score,
        comment: "Warm pressing, quiet surfaces".into(),
        created_at: at,
        updated_at: at,
        deleted_at: None,
    }
}

fn configure(backend: MockMarketBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(ReviewsForVinylRoute::<MockMarketBackend>::new())
            .service(CreateReviewRoute::<MockMarketBackend>::new())
            .service(DeleteReviewRoute::<MockMarketBackend>::new())
            .app_data(web::Data::new(ReviewApi::new(backend)));
    }
}

#[actix_web::test]
async fn create_review() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend
        .expect_create_review()
        .withf(|user_id, vinyl_id, r| *user_id == 4 && *vinyl_id == 9 && r.score == 5)
        .times(1)
        .returning(|user_id, vinyl_id, r| Ok((review(1, user_id, vinyl_id, r.score), Rating::from(500))));
    backend.allow_logging();
    let token = issue_token(4, Role::User);
    let req = TestRequest::post()
        .uri("/reviews/9")
        .insert_header(bearer(&token))
        .set_json(NewReview::new(5, "A flawless reissue of a classic"));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, r#"{"message":"Successfully created vinyl's review"}"#);
}

#[actix_web::test]
async fn create_review_without_token() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/reviews/9").set_json(NewReview::new(5, "A flawless reissue of a classic"));
    let (status, body) = send_request(req, configure(MockMarketBackend::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Missing bearer token."}"#);
}

#[actix_web::test]
async fn create_review_with_tampered_token() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token(4, Role::User);
    token.replace_range(token.len() - 10..token.len() - 5, "AAAAA");
    let req = TestRequest::post()
        .uri("/reviews/9")
        .insert_header(bearer(&token))
        .set_json(NewReview::new(5, "A flawless reissue of a classic"));
    let (status, _) = send_request(req, configure(MockMarketBackend::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn invalid_review_is_rejected_before_storage() {
    let _ = env_logger::try_init().ok();
    // No expectations: touching the backend would panic
    let backend = MockMarketBackend::new();
    let token = issue_token(4, Role::User);
    let req = TestRequest::post().uri("/reviews/9").insert_header(bearer(&token)).set_json(NewReview::new(0, "meh"));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        r#"{"error":"score must be between 1 and 5, comment must be at least 10 characters long"}"#
    );
}

#[actix_web::test]
async fn malformed_body() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::User);
    let req = TestRequest::post()
        .uri("/reviews/9")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"score": "five"}"#);
    let (status, body) = send_request(req, configure(MockMarketBackend::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Could not read request body"#), "{body}");
}

#[actix_web::test]
async fn second_review_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend.expect_create_review().returning(|_, _, _| Err(ReviewError::AlreadyReviewed));
    let token = issue_token(4, Role::User);
    let req = TestRequest::post()
        .uri("/reviews/9")
        .insert_header(bearer(&token))
        .set_json(NewReview::new(4, "Still great on the second spin"));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"User has already reviewed this vinyl"}"#);
}

#[actix_web::test]
async fn review_for_unknown_vinyl() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend.expect_create_review().returning(|_, vinyl_id, _| Err(ReviewError::VinylNotFound(vinyl_id)));
    let token = issue_token(4, Role::User);
    let req = TestRequest::post()
        .uri("/reviews/404")
        .insert_header(bearer(&token))
        .set_json(NewReview::new(4, "Cannot review what is not there"));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Vinyl with ID 404 not found"}"#);
}

#[actix_web::test]
async fn delete_own_review() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend
        .expect_delete_review()
        .withf(|id, requester| *id == 12 && requester.user_id == 4 && !requester.is_admin())
        .times(1)
        .returning(|id, _| Ok((review(id, 4, 9, 3), Some(Rating::from(450)))));
    backend.allow_logging();
    let token = issue_token(4, Role::User);
    let req = TestRequest::delete().uri("/reviews/12").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Review deleted successfully"}"#);
}

#[actix_web::test]
async fn delete_someone_elses_review() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend.expect_delete_review().returning(|_, _| Err(ReviewError::Forbidden));
    let token = issue_token(5, Role::User);
    let req = TestRequest::delete().uri("/reviews/12").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"You can only delete your own reviews"}"#);
}

#[actix_web::test]
async fn admin_deletes_any_review() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend
        .expect_delete_review()
        .withf(|_, requester| requester.is_admin())
        .returning(|id, _| Ok((review(id, 4, 9, 1), None)));
    backend.allow_logging();
    let token = issue_token(1, Role::Admin);
    let req = TestRequest::delete().uri("/reviews/12").insert_header(bearer(&token));
    let (status, _) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn list_reviews_is_public() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend
        .expect_fetch_reviews_for_vinyl()
        .withf(|vinyl_id, p| *vinyl_id == 9 && p.page() == 2 && p.limit() == 1)
        .returning(|_, p| Ok(Page::new(vec![review(2, 5, 9, 4)], 2, p)));
    let req = TestRequest::get().uri("/reviews/vinyl/9?page=2&limit=1");
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::OK);
    let page: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(page["total"], 2);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["data"][0]["score"], 4);
}

#[actix_web::test]
async fn malformed_page_query() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/reviews/vinyl/9?page=abc");
    let (status, body) = send_request(req, configure(MockMarketBackend::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Invalid query string: "#), "{body}");
}

#[actix_web::test]
async fn huge_page_number() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend
        .expect_fetch_reviews_for_vinyl()
        .withf(|_, p| p.page() == i64::MAX && p.offset() == i64::MAX)
        .returning(|_, p| Ok(Page::new(vec![], 2, p)));
    let req = TestRequest::get().uri("/reviews/vinyl/9?page=9223372036854775807");
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::OK);
    let page: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(page["data"], serde_json::json!([]));
}
