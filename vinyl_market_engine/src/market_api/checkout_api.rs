use std::{collections::BTreeMap, fmt::Debug};

use log::*;
use stripe_tools::{NewCheckoutSession, NewLineItem, MAX_LINE_ITEM_QUANTITY};

use crate::{
    db_types::Vinyl,
    market_api::{
        checkout_objects::{CheckoutRequest, CheckoutSessionHandle, CheckoutUrls},
        errors::CheckoutError,
    },
    traits::{CatalogManagement, PaymentGateway},
};

/// Product metadata key that carries the catalog id through the payment provider and back in the webhook.
pub const VINYL_ID_METADATA_KEY: &str = "vinylId";

/// `CheckoutApi` turns a cart into a hosted checkout session at the payment provider.
///
/// Prices always come from the catalog. The client only says what it wants and how many.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
    urls: CheckoutUrls,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({:?})", self.urls)
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(db: B, gateway: G, urls: CheckoutUrls) -> Self {
        Self { db, gateway, urls }
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: CatalogManagement,
    G: PaymentGateway,
{
    /// Validates the cart, prices it from the catalog and builds the session request, without contacting the payment
    /// provider.
    pub async fn build_checkout_session(&self, request: &CheckoutRequest) -> Result<NewCheckoutSession, CheckoutError> {
        if request.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if let Some(item) = request.items.iter().find(|i| !(1..=MAX_LINE_ITEM_QUANTITY).contains(&i.quantity)) {
            return Err(CheckoutError::InvalidQuantity { vinyl_id: item.vinyl_id, quantity: item.quantity });
        }
        let currency = request.currency.code().to_string();
        let mut line_items = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let vinyl =
                self.db.fetch_vinyl(item.vinyl_id).await?.ok_or(CheckoutError::VinylNotFound(item.vinyl_id))?;
            line_items.push(line_item_for(&vinyl, item.quantity, &currency));
        }
        let session = NewCheckoutSession {
            line_items,
            success_url: self.urls.success_url.clone(),
            cancel_url: self.urls.cancel_url.clone(),
            customer_email: request.customer_email.clone(),
        };
        if session.total().is_none() {
            return Err(CheckoutError::TotalTooLarge);
        }
        Ok(session)
    }

    /// Creates a checkout session for the cart and returns the hosted payment page URL.
    pub async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSessionHandle, CheckoutError> {
        let session = self.build_checkout_session(&request).await?;
        let total = session.total().unwrap_or_default();
        let created = self.gateway.create_checkout_session(&session).await.map_err(|e| {
            error!("💳️ Payment gateway refused checkout session for {} items. {e}", session.line_items.len());
            CheckoutError::Gateway(e.to_string())
        })?;
        info!("💳️ Checkout session {} created for {total} {}", created.id, request.currency);
        let session_id = created.url.unwrap_or(created.id);
        Ok(CheckoutSessionHandle { session_id })
    }
}

fn line_item_for(vinyl: &Vinyl, quantity: i64, currency: &str) -> NewLineItem {
    let mut metadata = BTreeMap::new();
    metadata.insert(VINYL_ID_METADATA_KEY.to_string(), vinyl.id.to_string());
    NewLineItem {
        name: format!("{} — {}", vinyl.name, vinyl.author_name),
        currency: currency.to_string(),
        unit_amount: vinyl.price,
        quantity,
        image: vinyl.image.clone().filter(|s| !s.is_empty()),
        metadata,
    }
}
