use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use vinyl_market_engine::{
    db_types::{Cents, LogLevel, Order, OrderItem, OrderWithItems, Page, Role, SystemLog},
    OrderStoreApi,
    SystemLogApi,
};

use super::{
    helpers::{bearer, issue_token, send_request},
    mocks::MockMarketBackend,
};
use crate::routes::{OrderBySessionRoute, OrdersRoute, SystemLogsRoute, WhoamiRoute};

fn order(id: i64, session: &str) -> OrderWithItems {
    OrderWithItems {
        order: Order {
            id,
            email: "buyer@example.com".into(),
            stripe_session_id: session.into(),
            stripe_payment_intent_id: Some(format!("pi_{id}")),
            total_amount: Cents::from(5998),
            created_at: Utc.with_ymd_and_hms(2024, 10, 16, 9, 30, 0).unwrap(),
        },
        items: vec![OrderItem { id: 1, order_id: id, vinyl_id: 3, quantity: 2, price: Cents::from(2999) }],
    }
}

fn configure(backend: MockMarketBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(OrdersRoute::<MockMarketBackend>::new())
            .service(OrderBySessionRoute::<MockMarketBackend>::new())
            .app_data(web::Data::new(OrderStoreApi::new(backend)));
    }
}

#[actix_web::test]
async fn admin_lists_orders() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend.expect_fetch_all_orders().returning(|| Ok(vec![order(1, "cs_test_a"), order(2, "cs_test_b")]));
    let token = issue_token(1, Role::Admin);
    let req = TestRequest::get().uri("/orders").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 2);
    assert_eq!(orders[1]["stripe_session_id"], "cs_test_b");
    assert_eq!(orders[0]["items"][0]["quantity"], 2);
}

#[actix_web::test]
async fn users_cannot_list_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::User);
    let req = TestRequest::get().uri("/orders").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure(MockMarketBackend::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient permissions. User role cannot access this resource"}"#);
}

#[actix_web::test]
async fn order_by_session() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend
        .expect_fetch_order_by_session_id()
        .withf(|s| s == "cs_test_a")
        .returning(|s| Ok(Some(order(7, s))));
    let token = issue_token(1, Role::Admin);
    let req = TestRequest::get().uri("/orders/session/cs_test_a").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::OK);
    let order: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["id"], 7);
}

#[actix_web::test]
async fn unknown_session() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend.expect_fetch_order_by_session_id().returning(|_| Ok(None));
    let token = issue_token(1, Role::Admin);
    let req = TestRequest::get().uri("/orders/session/cs_nope").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Order for session cs_nope not found"}"#);
}

#[actix_web::test]
async fn system_logs_for_admins() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockMarketBackend::new();
    backend.expect_fetch_logs().returning(|p| {
        let log = SystemLog {
            id: 3,
            level: LogLevel::Error,
            message: "Error sending success email to buyer@example.com".into(),
            created_at: Utc::now(),
        };
        Ok(Page::new(vec![log], 1, p))
    });
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.service(SystemLogsRoute::<MockMarketBackend>::new()).app_data(web::Data::new(SystemLogApi::new(backend)));
    };
    let token = issue_token(1, Role::Admin);
    let req = TestRequest::get().uri("/system_logs").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    let page: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(page["data"][0]["level"], "error");
    assert_eq!(page["limit"], 10);
}

#[actix_web::test]
async fn whoami() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::User);
    let req = TestRequest::get().uri("/whoami").insert_header(bearer(&token));
    let (status, body) = send_request(req, |cfg| {
        cfg.service(WhoamiRoute::new());
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let claims: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(claims["sub"], 4);
    assert_eq!(claims["email"], "user4@example.com");
    assert_eq!(claims["role"], "User");
}
