//! # Backend contracts
//!
//! The traits in this module define what a storage backend (and the payment provider) must offer the market engine.
//! The engine APIs are generic over these traits, so they can be exercised against SQLite in integration tests and
//! against mocks in the server's endpoint tests.
//!
//! * [`OrderManagement`] persists orders created from completed checkout sessions.
//! * [`CatalogManagement`] looks up vinyls (and the users that own and review them).
//! * [`ReviewManagement`] stores reviews and keeps each vinyl's average rating in step with them.
//! * [`SystemLogManagement`] is the persistent audit trail.
//! * [`PaymentGateway`] is the hosted-checkout provider.
mod catalog_management;
mod data_objects;
mod order_management;
mod payment_gateway;
mod review_management;
mod system_log_management;

pub use catalog_management::{CatalogError, CatalogManagement};
pub use data_objects::Requester;
pub use order_management::{InsertOrderResult, OrderManagement, OrderStoreError};
pub use payment_gateway::{GatewayError, PaymentGateway};
pub use review_management::{ReviewError, ReviewManagement};
pub use system_log_management::{SystemLogError, SystemLogManagement};
