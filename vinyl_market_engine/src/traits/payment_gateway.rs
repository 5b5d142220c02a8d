use stripe_tools::{CheckoutSession, Event, LineItem, List, NewCheckoutSession, SignatureError, StripeApiError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Payment gateway request failed: {0}")]
    RequestFailed(String),
    #[error("Webhook signature verification failed: {0}")]
    InvalidSignature(String),
    #[error("Webhook payload could not be parsed: {0}")]
    InvalidPayload(String),
}

/// The operations the market needs from a hosted-checkout payment provider.
///
/// A single instance is built from configuration at startup and handed to the checkout and webhook APIs.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn create_checkout_session(&self, session: &NewCheckoutSession) -> Result<CheckoutSession, GatewayError>;

    /// Fetches the session with its line items, and each line item's product, expanded. Only the first page of line
    /// items is included; `has_more` on the list says whether there are others.
    async fn retrieve_session_with_line_items(&self, session_id: &str) -> Result<CheckoutSession, GatewayError>;

    /// Fetches the next page of the session's line items, following the line item `starting_after`.
    async fn list_line_items(&self, session_id: &str, starting_after: &str) -> Result<List<LineItem>, GatewayError>;

    /// Verifies the signature of a webhook delivery against the raw request body and parses the event.
    fn construct_event(&self, payload: &[u8], signature_header: &str) -> Result<Event, GatewayError>;
}

impl From<SignatureError> for GatewayError {
    fn from(e: SignatureError) -> Self {
        match e {
            SignatureError::InvalidPayload(s) => GatewayError::InvalidPayload(s),
            e => GatewayError::InvalidSignature(e.to_string()),
        }
    }
}

impl From<StripeApiError> for GatewayError {
    fn from(e: StripeApiError) -> Self {
        GatewayError::RequestFailed(e.to_string())
    }
}
