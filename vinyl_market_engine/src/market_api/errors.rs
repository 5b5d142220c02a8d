use stripe_tools::MAX_LINE_ITEM_QUANTITY;
use thiserror::Error;

use crate::traits::{CatalogError, GatewayError, OrderStoreError};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("No items provided")]
    EmptyCart,
    #[error("Quantity for vinyl {vinyl_id} must be between 1 and {}, got {quantity}", MAX_LINE_ITEM_QUANTITY)]
    InvalidQuantity { vinyl_id: i64, quantity: i64 },
    #[error("Order total is too large")]
    TotalTooLarge,
    #[error("Vinyl with ID {0} not found")]
    VinylNotFound(i64),
    /// The detail is logged, but not shown to the buyer.
    #[error("Failed to create checkout session")]
    Gateway(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<CatalogError> for CheckoutError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::VinylNotFound(id) => CheckoutError::VinylNotFound(id),
            CatalogError::DatabaseError(s) => CheckoutError::DatabaseError(s),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    #[error("Missing stripe-signature header")]
    MissingSignature,
    #[error("Webhook Error: {0}")]
    InvalidEvent(String),
    #[error("Payment gateway error: {0}")]
    Gateway(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Malformed checkout session: {0}")]
    MalformedSession(String),
}

impl From<GatewayError> for WebhookError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::RequestFailed(s) => WebhookError::Gateway(s),
            GatewayError::InvalidSignature(s) | GatewayError::InvalidPayload(s) => WebhookError::InvalidEvent(s),
        }
    }
}

impl From<OrderStoreError> for WebhookError {
    fn from(e: OrderStoreError) -> Self {
        WebhookError::Database(e.to_string())
    }
}
