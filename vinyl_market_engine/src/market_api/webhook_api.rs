use std::fmt::Debug;

use log::*;
use stripe_tools::{CheckoutSession, Event, EventType, PaymentIntent};

use crate::{
    db_types::{Cents, LogLevel, NewOrder, NewOrderItem},
    events::{EventProducers, OrderCreatedEvent},
    market_api::{audit, checkout_api::VINYL_ID_METADATA_KEY, errors::WebhookError},
    traits::{InsertOrderResult, OrderManagement, PaymentGateway, SystemLogManagement},
};

/// What a verified webhook delivery led to. Every variant is acknowledged to the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A new order was stored with the given id.
    OrderCreated(i64),
    /// The session had already been turned into the given order. Nothing was written.
    DuplicateSession(i64),
    PaymentIntentSucceeded(String),
    Unhandled(String),
}

/// `WebhookApi` verifies and processes payment provider webhook deliveries.
///
/// Completed checkout sessions become orders. The provider retries deliveries until it gets a success response, so
/// processing the same session twice must not create a second order.
pub struct WebhookApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
}

impl<B, G> Debug for WebhookApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookApi")
    }
}

impl<B, G> WebhookApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self { db, gateway, producers }
    }
}

impl<B, G> WebhookApi<B, G>
where
    B: OrderManagement + SystemLogManagement,
    G: PaymentGateway,
{
    /// Entry point for a raw webhook delivery. `payload` must be the request body exactly as received.
    pub async fn handle_webhook(&self, payload: &[u8], signature: Option<&str>) -> Result<WebhookOutcome, WebhookError> {
        let signature = signature.filter(|s| !s.trim().is_empty()).ok_or(WebhookError::MissingSignature)?;
        let event = self.gateway.construct_event(payload, signature).map_err(|e| {
            warn!("🪝️ Rejected webhook delivery. {e}");
            WebhookError::InvalidEvent(e.to_string())
        })?;
        info!("🪝️ Received {} event {}", event.event_type, event.id);
        match self.process_event(&event).await {
            Ok(outcome) => {
                debug!("🪝️ Event {} processed: {outcome:?}", event.id);
                Ok(outcome)
            },
            Err(e) => {
                error!("🪝️ Error processing event {}. {e}", event.id);
                let message = format!("Webhook processing error for event {} ({}): {e}", event.id, event.event_type);
                audit::record(&self.db, LogLevel::Error, &message).await;
                Err(e)
            },
        }
    }

    /// Dispatches a verified event on its type.
    pub async fn process_event(&self, event: &Event) -> Result<WebhookOutcome, WebhookError> {
        match event.kind() {
            EventType::CheckoutSessionCompleted => {
                let session = event
                    .data_object::<CheckoutSession>()
                    .map_err(|e| WebhookError::MalformedSession(e.to_string()))?;
                audit::record(&self.db, LogLevel::Info, &format!("Checkout session completed {}", session.id)).await;
                self.handle_checkout_completed(&session.id).await
            },
            EventType::PaymentIntentSucceeded => {
                let intent = event
                    .data_object::<PaymentIntent>()
                    .map_err(|e| WebhookError::InvalidEvent(format!("Invalid payment intent. {e}")))?;
                info!("🪝️ PaymentIntent {} succeeded", intent.id);
                audit::record(&self.db, LogLevel::Info, &format!("PaymentIntent succeeded {}", intent.id)).await;
                Ok(WebhookOutcome::PaymentIntentSucceeded(intent.id))
            },
            EventType::Other(event_type) => {
                info!("🪝️ Unhandled Stripe event type: {event_type}");
                audit::record(&self.db, LogLevel::Info, &format!("Unhandled Stripe event type: {event_type}")).await;
                Ok(WebhookOutcome::Unhandled(event_type))
            },
        }
    }

    /// Turns a completed checkout session into an order.
    ///
    /// The session is fetched again from the provider with its line items expanded, since the event only carries the
    /// bare session. If an order already exists for the session, nothing is written and no event is published.
    pub async fn handle_checkout_completed(&self, session_id: &str) -> Result<WebhookOutcome, WebhookError> {
        let mut session = self.gateway.retrieve_session_with_line_items(session_id).await?;
        self.fetch_remaining_line_items(&mut session).await?;
        trace!("🪝️ Session {session_id} has {} line items", session.line_items().len());
        let order = new_order_from_session(&session)?;
        match self.db.create_order(order).await? {
            InsertOrderResult::Inserted(id) => {
                let stored = self.db.fetch_order_by_session_id(&session.id).await?.ok_or_else(|| {
                    WebhookError::Database(format!("Order #{id} could not be read back after it was created"))
                })?;
                info!("🪝️ Order #{id} created for session {session_id} ({})", stored.order.total_amount);
                audit::record(&self.db, LogLevel::Info, &format!("Order created successfully for session {session_id}"))
                    .await;
                let mut event = OrderCreatedEvent::new(stored.order, stored.items, session.line_items().to_vec());
                if let Some(currency) = session.currency.as_deref() {
                    event = event.with_currency(currency);
                }
                let delivered = self.producers.publish_order_created(event);
                trace!("🪝️ Order #{id} announced to {delivered} subscriber(s)");
                Ok(WebhookOutcome::OrderCreated(id))
            },
            InsertOrderResult::AlreadyExists(id) => {
                info!("🪝️ Session {session_id} was already processed as order #{id}. Acknowledging redelivery.");
                Ok(WebhookOutcome::DuplicateSession(id))
            },
        }
    }
}

impl<B, G> WebhookApi<B, G>
where G: PaymentGateway
{
    /// Follows the line item pages of an expanded session until all of them are in `session.line_items`.
    async fn fetch_remaining_line_items(&self, session: &mut CheckoutSession) -> Result<(), WebhookError> {
        let Some(list) = session.line_items.as_mut() else {
            return Ok(());
        };
        while list.has_more {
            let last = list.data.last().map(|l| l.id.clone()).ok_or_else(|| {
                let id = &session.id;
                WebhookError::MalformedSession(format!("Session {id} has more line items after an empty page"))
            })?;
            let page = self.gateway.list_line_items(&session.id, &last).await?;
            trace!("🪝️ Fetched {} more line items for session {}", page.data.len(), session.id);
            if page.data.is_empty() && page.has_more {
                return Err(WebhookError::MalformedSession(format!(
                    "Line item listing for session {} did not advance",
                    session.id
                )));
            }
            list.data.extend(page.data);
            list.has_more = page.has_more;
        }
        Ok(())
    }
}

/// Maps an expanded checkout session onto a new order.
///
/// Line items whose product metadata lacks a numeric vinyl id are kept with `vinyl_id: None`; the store drops them.
/// A missing quantity counts as one and a missing unit price as zero.
pub fn new_order_from_session(session: &CheckoutSession) -> Result<NewOrder, WebhookError> {
    let email = session
        .email()
        .ok_or_else(|| WebhookError::MalformedSession(format!("Session {} has no customer email", session.id)))?;
    let total = session
        .amount_total
        .ok_or_else(|| WebhookError::MalformedSession(format!("Session {} has no total amount", session.id)))?;
    let mut order = NewOrder::new(email, session.id.as_str(), Cents::from(total));
    if let Some(pi) = session.payment_intent_id() {
        order = order.with_payment_intent(pi);
    }
    for line in session.line_items() {
        let vinyl_id = line.product_metadata(VINYL_ID_METADATA_KEY).and_then(|s| s.trim().parse::<i64>().ok());
        if vinyl_id.is_none() {
            warn!("🪝️ Line item {} of session {} does not identify a vinyl", line.id, session.id);
        }
        let quantity = line.quantity.unwrap_or(1);
        let unit_amount = line.price.as_ref().and_then(|p| p.unit_amount).unwrap_or_else(|| {
            warn!("🪝️ Line item {} of session {} has no unit price. Recording it at zero.", line.id, session.id);
            0
        });
        order = order.with_item(NewOrderItem::new(vinyl_id, quantity, Cents::from(unit_amount)));
    }
    Ok(order)
}
