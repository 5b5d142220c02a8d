use actix_web::{
    body::to_bytes,
    http::StatusCode,
    test,
    test::TestRequest,
    web::{JsonConfig, QueryConfig, ServiceConfig},
    App,
};
use chrono::Duration;
use log::debug;
use vinyl_market_engine::db_types::Role;

use crate::{
    auth::{JwtClaims, TokenIssuer, TokenVerifier},
    config::AuthConfig,
    errors::ServerError,
    middleware::JwtMiddlewareFactory,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("endpoint-tests-only-7f3a9c2e51d84b06")
}

pub fn issue_token(user_id: i64, role: Role) -> String {
    let claims = JwtClaims::new(user_id, format!("user{user_id}@example.com"), role, Duration::days(1));
    TokenIssuer::new(&get_auth_config()).issue_token(&claims).expect("Failed to sign token")
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Sends `req` through an app with the bearer token middleware and the routes set up by `configure`. Errors raised by
/// middleware are rendered into responses the same way the server would.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let json_config =
        JsonConfig::default().error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
    let query_config =
        QueryConfig::default().error_handler(|err, _req| ServerError::InvalidQuery(err.to_string()).into());
    let app = App::new()
        .wrap(JwtMiddlewareFactory::new(TokenVerifier::new(&get_auth_config())))
        .app_data(json_config)
        .app_data(query_config)
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = to_bytes(res.into_body()).await.unwrap();
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}
