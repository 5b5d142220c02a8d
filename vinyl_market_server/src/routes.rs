//! Request handler definitions
//!
//! Define each route and its handler here. Payment provider routes live in [`crate::stripe_routes`].
//!
//! Since each worker thread processes its requests sequentially, handlers must never block the current thread. Any
//! I/O (the database, the payment provider) is awaited, so that the worker can serve other requests in the meantime.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use vinyl_market_engine::{
    db_types::{NewReview, Pagination, Role},
    traits::{OrderManagement, ReviewManagement, SystemLogManagement},
    OrderStoreApi,
    ReviewApi,
    SystemLogApi,
};

use crate::{auth::JwtClaims, data_objects::MessageResponse, errors::ServerError};

/// Everything the review routes need from a backend.
pub trait ReviewBackend: ReviewManagement + SystemLogManagement {}
impl<T: ReviewManagement + SystemLogManagement> ReviewBackend for T {}

/// Everything the webhook route needs from a backend.
pub trait WebhookBackend: OrderManagement + SystemLogManagement {}
impl<T: OrderManagement + SystemLogManagement> WebhookBackend for T {}

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),+])  => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

route!(whoami => Get "/whoami" requires [Role::User, Role::Admin]);
/// Echoes the verified token claims. Handy for checking what the server makes of a token.
pub async fn whoami(claims: JwtClaims) -> HttpResponse {
    HttpResponse::Ok().json(claims)
}

//----------------------------------------------   Reviews  ----------------------------------------------------
route!(create_review => Post "/reviews/{vinyl_id}" impl ReviewBackend where requires [Role::User, Role::Admin]);
pub async fn create_review<B: ReviewBackend>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<NewReview>,
    api: web::Data<ReviewApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let vinyl_id = path.into_inner();
    debug!("⭐️ POST review for vinyl #{vinyl_id} from user #{}", claims.sub);
    api.create_review(claims.sub, vinyl_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(MessageResponse::new("Successfully created vinyl's review")))
}

route!(delete_review => Delete "/reviews/{review_id}" impl ReviewBackend where requires [Role::User, Role::Admin]);
pub async fn delete_review<B: ReviewBackend>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<ReviewApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let review_id = path.into_inner();
    debug!("⭐️ DELETE review #{review_id} by user #{}", claims.sub);
    api.remove_review(review_id, &claims.requester()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Review deleted successfully")))
}

route!(reviews_for_vinyl => Get "/reviews/vinyl/{vinyl_id}" impl ReviewBackend);
pub async fn reviews_for_vinyl<B: ReviewBackend>(
    path: web::Path<i64>,
    query: web::Query<Pagination>,
    api: web::Data<ReviewApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let vinyl_id = path.into_inner();
    trace!("⭐️ GET reviews for vinyl #{vinyl_id}");
    let page = api.reviews_for_vinyl(vinyl_id, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(orders => Get "/orders" impl OrderManagement where requires [Role::Admin]);
pub async fn orders<B: OrderManagement>(api: web::Data<OrderStoreApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET all orders");
    let orders = api.find_all().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_session => Get "/orders/session/{session_id}" impl OrderManagement where requires [Role::Admin]);
pub async fn order_by_session<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderStoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let session_id = path.into_inner();
    trace!("💻️ GET order for session {session_id}");
    let order = api.find_by_session_id(&session_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   System logs  ----------------------------------------------------
route!(system_logs => Get "/system_logs" impl SystemLogManagement where requires [Role::Admin]);
pub async fn system_logs<B: SystemLogManagement>(
    query: web::Query<Pagination>,
    api: web::Data<SystemLogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let page = api.fetch_logs(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}
