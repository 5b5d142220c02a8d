use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use stripe_tools::CheckoutSession;
use vinyl_market_engine::{
    checkout_objects::{CheckoutItem, CheckoutRequest, CheckoutUrls},
    db_types::{Cents, Rating, Role, Vinyl},
    traits::GatewayError,
    CheckoutApi,
};

use super::{
    helpers::{bearer, issue_token, send_request},
    mocks::{MockGateway, MockMarketBackend},
};
use crate::stripe_routes::CreateCheckoutSessionRoute;

fn vinyl(id: i64) -> Vinyl {
    Vinyl {
        id,
        name: "Blue Train".into(),
        author_name: "John Coltrane".into(),
        description: String::new(),
        image: None,
        price: Cents::from(2999),
        average_rating: Rating::default(),
        owner_id: None,
    }
}

fn catalog() -> MockMarketBackend {
    let mut backend = MockMarketBackend::new();
    backend.expect_fetch_vinyl().returning(|id| Ok((id < 100).then(|| vinyl(id))));
    backend
}

fn configure(backend: MockMarketBackend, gateway: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(CreateCheckoutSessionRoute::<MockMarketBackend, MockGateway>::new())
            .app_data(web::Data::new(CheckoutApi::new(backend, gateway, CheckoutUrls::default())));
    }
}

fn session_url() -> Result<CheckoutSession, GatewayError> {
    Ok(CheckoutSession {
        id: "cs_test_1".into(),
        url: Some("https://checkout.stripe.test/c/pay/cs_test_1".into()),
        ..Default::default()
    })
}

#[actix_web::test]
async fn checkout_uses_account_email() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_checkout_session()
        .withf(|s| {
            s.customer_email.as_deref() == Some("user4@example.com") &&
                s.line_items.len() == 1 &&
                s.line_items[0].quantity == 2 &&
                s.line_items[0].unit_amount == Cents::from(2999)
        })
        .times(1)
        .returning(|_| session_url());
    let token = issue_token(4, Role::User);
    let req = TestRequest::post()
        .uri("/create-checkout-session")
        .insert_header(bearer(&token))
        .set_json(CheckoutRequest::new(vec![CheckoutItem::new(3, 2)]));
    let (status, body) = send_request(req, configure(catalog(), gateway)).await;
    assert_eq!(status, StatusCode::OK);
    let handle: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(handle["sessionId"], "https://checkout.stripe.test/c/pay/cs_test_1");
}

#[actix_web::test]
async fn checkout_keeps_requested_email() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_checkout_session()
        .withf(|s| s.customer_email.as_deref() == Some("gift@example.com"))
        .returning(|_| session_url());
    let token = issue_token(4, Role::User);
    let req = TestRequest::post()
        .uri("/create-checkout-session")
        .insert_header(bearer(&token))
        .set_json(CheckoutRequest::new(vec![CheckoutItem::new(3, 1)]).with_customer_email("gift@example.com"));
    let (status, _) = send_request(req, configure(catalog(), gateway)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn empty_cart() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::User);
    let req = TestRequest::post()
        .uri("/create-checkout-session")
        .insert_header(bearer(&token))
        .set_json(CheckoutRequest::new(vec![]));
    let (status, body) = send_request(req, configure(MockMarketBackend::new(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"No items provided"}"#);
}

#[actix_web::test]
async fn unknown_vinyl() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::User);
    let req = TestRequest::post()
        .uri("/create-checkout-session")
        .insert_header(bearer(&token))
        .set_json(CheckoutRequest::new(vec![CheckoutItem::new(3, 1), CheckoutItem::new(404, 1)]));
    let (status, body) = send_request(req, configure(catalog(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Vinyl with ID 404 not found"}"#);
}

#[actix_web::test]
async fn gateway_failure_is_opaque() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_checkout_session()
        .returning(|_| Err(GatewayError::RequestFailed("Invalid API Key provided: sk_test_****".into())));
    let token = issue_token(4, Role::User);
    let req = TestRequest::post()
        .uri("/create-checkout-session")
        .insert_header(bearer(&token))
        .set_json(CheckoutRequest::new(vec![CheckoutItem::new(3, 1)]));
    let (status, body) = send_request(req, configure(catalog(), gateway)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("sk_test"));
}

#[actix_web::test]
async fn checkout_requires_login() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/create-checkout-session")
        .set_json(CheckoutRequest::new(vec![CheckoutItem::new(3, 1)]));
    let (status, _) = send_request(req, configure(MockMarketBackend::new(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn oversized_quantity() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::User);
    let req = TestRequest::post()
        .uri("/create-checkout-session")
        .insert_header(bearer(&token))
        .set_json(CheckoutRequest::new(vec![CheckoutItem::new(3, i64::MAX / 1000)]));
    let (status, body) = send_request(req, configure(MockMarketBackend::new(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("must be between 1 and 999999"), "{body}");
}
