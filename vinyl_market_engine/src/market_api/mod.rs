//! The public API of the market engine.
//!
//! Each API object is generic over the backend traits it needs, and (where relevant) the [`PaymentGateway`]. The
//! server constructs one of each at startup and shares them between workers.
//!
//! [`PaymentGateway`]: crate::traits::PaymentGateway
pub mod audit;
pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod order_store_api;
pub mod review_api;
pub mod system_log_api;
pub mod webhook_api;
