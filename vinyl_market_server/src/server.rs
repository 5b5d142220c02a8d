use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use vinyl_market_engine::{
    events::EventProducers,
    CheckoutApi,
    OrderStoreApi,
    ReviewApi,
    SqliteDatabase,
    SystemLogApi,
    WebhookApi,
};

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    integrations::{notifications::create_notification_handlers, stripe::StripeGateway},
    middleware::JwtMiddlewareFactory,
    routes::{
        health,
        CreateReviewRoute,
        DeleteReviewRoute,
        OrderBySessionRoute,
        OrdersRoute,
        ReviewsForVinylRoute,
        SystemLogsRoute,
        WhoamiRoute,
    },
    stripe_routes::{CreateCheckoutSessionRoute, StripeWebhookRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_notification_handlers(config.notifications.clone(), config.event_buffer_size, db.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let producers = handlers.producers();
    handlers.start_handlers().await;
    info!("📬️ Notification handlers started");
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(ServerError::from)
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let gateway = StripeGateway::new(config.stripe).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let verifier = TokenVerifier::new(&config.auth);
    let urls = config.checkout_urls;
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), gateway.clone(), urls.clone());
        let webhook_api = WebhookApi::new(db.clone(), gateway.clone(), producers.clone());
        let orders_api = OrderStoreApi::new(db.clone());
        let reviews_api = ReviewApi::new(db.clone());
        let logs_api = SystemLogApi::new(db.clone());
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
        let query_config =
            web::QueryConfig::default().error_handler(|err, _req| ServerError::InvalidQuery(err.to_string()).into());
        let admin_scope = web::scope("/api")
            .service(OrdersRoute::<SqliteDatabase>::new())
            .service(OrderBySessionRoute::<SqliteDatabase>::new())
            .service(SystemLogsRoute::<SqliteDatabase>::new())
            .service(WhoamiRoute::new());
        let stripe_scope = web::scope("/stripe")
            .service(CreateCheckoutSessionRoute::<SqliteDatabase, StripeGateway>::new())
            .service(StripeWebhookRoute::<SqliteDatabase, StripeGateway>::new());
        App::new()
            .wrap(JwtMiddlewareFactory::new(verifier.clone()))
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("vms::access_log"))
            .app_data(json_config)
            .app_data(query_config)
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(webhook_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(reviews_api))
            .app_data(web::Data::new(logs_api))
            .service(health)
            .service(ReviewsForVinylRoute::<SqliteDatabase>::new())
            .service(CreateReviewRoute::<SqliteDatabase>::new())
            .service(DeleteReviewRoute::<SqliteDatabase>::new())
            .service(admin_scope)
            .service(stripe_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
