use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::Utc;
use vinyl_market_engine::{
    db_types::{Cents, Order, OrderItem, OrderWithItems},
    events::EventProducers,
    test_utils::stub_gateway::{checkout_completed_payload, completed_session, event_payload, StubGateway},
    traits::InsertOrderResult,
    WebhookApi,
};

use super::{helpers::send_request, mocks::MockMarketBackend};
use crate::stripe_routes::StripeWebhookRoute;

fn configure(backend: MockMarketBackend, gateway: StubGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(StripeWebhookRoute::<MockMarketBackend, StubGateway>::new())
            .app_data(web::Data::new(WebhookApi::new(backend, gateway, EventProducers::default())));
    }
}

fn delivery(gateway: &StubGateway, payload: Vec<u8>) -> TestRequest {
    let signature = gateway.sign(&payload);
    TestRequest::post().uri("/webhook").insert_header(("Stripe-Signature", signature)).set_payload(payload)
}

fn stored(id: i64, session_id: &str) -> OrderWithItems {
    OrderWithItems {
        order: Order {
            id,
            email: "buyer@example.com".into(),
            stripe_session_id: session_id.into(),
            stripe_payment_intent_id: Some(format!("pi_{session_id}")),
            total_amount: Cents::from(5998),
            created_at: Utc::now(),
        },
        items: vec![OrderItem { id: 1, order_id: id, vinyl_id: 3, quantity: 2, price: Cents::from(2999) }],
    }
}

#[actix_web::test]
async fn completed_checkout_creates_order() {
    let _ = env_logger::try_init().ok();
    let gateway = StubGateway::new();
    gateway.add_session(completed_session("cs_test_9", "buyer@example.com", &[(Some("3"), 2, 2999)]));
    let mut backend = MockMarketBackend::new();
    backend
        .expect_create_order()
        .withf(|o| {
            o.stripe_session_id == "cs_test_9" &&
                o.email == "buyer@example.com" &&
                o.total_amount == Cents::from(5998) &&
                o.items.len() == 1
        })
        .times(1)
        .returning(|_| Ok(InsertOrderResult::Inserted(5)));
    backend.expect_fetch_order_by_session_id().returning(|s| Ok(Some(stored(5, s))));
    backend.allow_logging();
    let req = delivery(&gateway, checkout_completed_payload("evt_1", "cs_test_9"));
    let (status, body) = send_request(req, configure(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true}"#);
}

#[actix_web::test]
async fn redelivery_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let gateway = StubGateway::new();
    gateway.add_session(completed_session("cs_test_9", "buyer@example.com", &[(Some("3"), 2, 2999)]));
    let mut backend = MockMarketBackend::new();
    backend.expect_create_order().times(1).returning(|_| Ok(InsertOrderResult::AlreadyExists(5)));
    backend.expect_fetch_order_by_session_id().never();
    backend.allow_logging();
    let req = delivery(&gateway, checkout_completed_payload("evt_2", "cs_test_9"));
    let (status, body) = send_request(req, configure(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true}"#);
}

#[actix_web::test]
async fn missing_signature() {
    let _ = env_logger::try_init().ok();
    let payload = checkout_completed_payload("evt_3", "cs_test_9");
    let req = TestRequest::post().uri("/webhook").set_payload(payload);
    let (status, body) = send_request(req, configure(MockMarketBackend::new(), StubGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Missing stripe-signature header"}"#);
}

#[actix_web::test]
async fn tampered_payload() {
    let _ = env_logger::try_init().ok();
    let gateway = StubGateway::new();
    let signature = gateway.sign(&checkout_completed_payload("evt_4", "cs_test_9"));
    let req = TestRequest::post()
        .uri("/webhook")
        .insert_header(("Stripe-Signature", signature))
        .set_payload(checkout_completed_payload("evt_4", "cs_test_other"));
    let (status, body) = send_request(req, configure(MockMarketBackend::new(), gateway)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Webhook Error: "#), "{body}");
}

#[actix_web::test]
async fn unhandled_event_type() {
    let _ = env_logger::try_init().ok();
    let gateway = StubGateway::new();
    let mut backend = MockMarketBackend::new();
    backend.allow_logging();
    let payload = event_payload("evt_5", "customer.created", serde_json::json!({ "id": "cus_1", "object": "customer" }));
    let req = delivery(&gateway, payload);
    let (status, body) = send_request(req, configure(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":true}"#);
}

#[actix_web::test]
async fn provider_outage_is_retried() {
    let _ = env_logger::try_init().ok();
    let gateway = StubGateway::new();
    gateway.fail_requests(true);
    let mut backend = MockMarketBackend::new();
    backend.expect_create_order().never();
    backend.allow_logging();
    let req = delivery(&gateway, checkout_completed_payload("evt_6", "cs_test_9"));
    let (status, _) = send_request(req, configure(backend, gateway)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
