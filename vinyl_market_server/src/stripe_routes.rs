//----------------------------------------------   Checkout  ----------------------------------------------------
use actix_web::{web, HttpRequest, HttpResponse};
use log::*;
use stripe_tools::webhook::SIGNATURE_HEADER;
use vinyl_market_engine::{
    checkout_objects::CheckoutRequest,
    db_types::Role,
    traits::{CatalogManagement, PaymentGateway},
    CheckoutApi,
    WebhookApi,
    WebhookOutcome,
};

use crate::{
    auth::JwtClaims,
    data_objects::WebhookAck,
    errors::ServerError,
    route,
    routes::WebhookBackend,
};

route!(
    create_checkout_session => Post "/create-checkout-session"
    impl CatalogManagement, PaymentGateway where requires [Role::User, Role::Admin]
);
pub async fn create_checkout_session<BCat, BPay>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<BCat, BPay>>,
) -> Result<HttpResponse, ServerError>
where
    BCat: CatalogManagement,
    BPay: PaymentGateway,
{
    let mut request = body.into_inner();
    // Receipts go to the account's address unless the buyer asked for another one
    if request.customer_email.as_deref().map_or(true, |s| s.trim().is_empty()) {
        request.customer_email = Some(claims.email.clone());
    }
    debug!("💳️ Checkout requested by user #{} for {} items", claims.sub, request.items.len());
    let handle = api.create_checkout_session(request).await?;
    Ok(HttpResponse::Ok().json(handle))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(stripe_webhook => Post "/webhook" impl WebhookBackend, PaymentGateway);
/// Receives Stripe webhook deliveries.
///
/// The body is taken as raw bytes: the signature covers the exact payload, so it must not pass through a JSON
/// extractor first. Every verified event is acknowledged with `{"received": true}`, including redelivered sessions and
/// event types the market does not handle. Stripe retries anything that is not a 2xx.
pub async fn stripe_webhook<BOrd, BPay>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<WebhookApi<BOrd, BPay>>,
) -> Result<HttpResponse, ServerError>
where
    BOrd: WebhookBackend,
    BPay: PaymentGateway,
{
    trace!("🪝️ Received webhook request ({} bytes)", body.len());
    let signature = req.headers().get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    match api.handle_webhook(&body, signature).await? {
        WebhookOutcome::OrderCreated(id) => info!("🪝️ Webhook created order #{id}"),
        WebhookOutcome::DuplicateSession(id) => info!("🪝️ Webhook redelivered a session for order #{id}"),
        outcome => debug!("🪝️ Webhook processed. {outcome:?}"),
    }
    Ok(HttpResponse::Ok().json(WebhookAck::received()))
}
