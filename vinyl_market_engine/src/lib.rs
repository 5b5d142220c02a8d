//! Vinyl Market Engine
//!
//! The core of the vinyl marketplace: turning carts into hosted checkout sessions, turning completed sessions into
//! orders, and keeping vinyl ratings in step with their reviews. It is independent of the HTTP layer and of any
//! particular payment provider account.
//!
//! The library is divided into these sections:
//! 1. Backend contracts ([`mod@traits`]). Storage backends implement these traits; the payment provider is reached
//!    through [`traits::PaymentGateway`]. SQLite is the supported backend ([`SqliteDatabase`]). The data types used by
//!    the backends are defined in [`mod@db_types`].
//! 2. The engine's public API ([`mod@market_api`]): [`CheckoutApi`], [`WebhookApi`], [`OrderStoreApi`],
//!    [`ReviewApi`] and [`SystemLogApi`].
//! 3. Events ([`mod@events`]). When a new order is created, an [`events::OrderCreatedEvent`] is published on a bounded
//!    channel. Subscribers (receipts, broadcasts) run on their own tasks and never hold up the webhook response.
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod events;
pub mod market_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use market_api::{
    checkout_api::CheckoutApi,
    checkout_objects,
    errors::{CheckoutError, WebhookError},
    order_store_api::OrderStoreApi,
    review_api::ReviewApi,
    system_log_api::SystemLogApi,
    webhook_api::{WebhookApi, WebhookOutcome},
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
