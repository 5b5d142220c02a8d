use stripe_tools::{
    CheckoutSession,
    Event,
    LineItem,
    List,
    NewCheckoutSession,
    StripeApi,
    StripeApiError,
    StripeConfig,
    LINE_ITEM_EXPANSION,
};
use vinyl_market_engine::traits::{GatewayError, PaymentGateway};

/// Stripe as the market's [`PaymentGateway`].
#[derive(Clone)]
pub struct StripeGateway(StripeApi);

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        Ok(Self(StripeApi::new(config)?))
    }
}

impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(&self, session: &NewCheckoutSession) -> Result<CheckoutSession, GatewayError> {
        Ok(self.0.create_checkout_session(session).await?)
    }

    async fn retrieve_session_with_line_items(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        Ok(self.0.retrieve_session(session_id, &LINE_ITEM_EXPANSION).await?)
    }

    async fn list_line_items(&self, session_id: &str, starting_after: &str) -> Result<List<LineItem>, GatewayError> {
        Ok(self.0.list_line_items(session_id, starting_after).await?)
    }

    fn construct_event(&self, payload: &[u8], signature_header: &str) -> Result<Event, GatewayError> {
        Ok(self.0.construct_event(payload, signature_header)?)
    }
}
