//! An in-memory [`PaymentGateway`] for tests.
//!
//! Webhook signatures are real: deliveries must be signed with [`StubGateway::sign`] (or
//! [`stripe_tools::webhook::signature_header`]) using the stub's secret.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use serde_json::json;
use stripe_tools::{
    webhook,
    CheckoutSession,
    Event,
    Expandable,
    LineItem,
    List,
    NewCheckoutSession,
    Price,
    Product,
};

use crate::traits::{GatewayError, PaymentGateway};

pub const STUB_WEBHOOK_SECRET: &str = "whsec_stub_gateway_secret";
/// Line items per page, matching Stripe's default for expanded lists.
pub const STUB_PAGE_SIZE: usize = 10;

#[derive(Default)]
struct StubState {
    created: Vec<NewCheckoutSession>,
    sessions: HashMap<String, CheckoutSession>,
    fail_requests: bool,
    line_item_requests: usize,
}

#[derive(Clone, Default)]
pub struct StubGateway {
    state: Arc<Mutex<StubState>>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next API calls fail, as if the provider were unreachable.
    pub fn fail_requests(&self, fail: bool) {
        self.state.lock().unwrap().fail_requests = fail;
    }

    /// Registers a session that `retrieve_session_with_line_items` will return. Its line items are handed out in pages of
    /// [`STUB_PAGE_SIZE`], the way Stripe does.
    pub fn add_session(&self, session: CheckoutSession) {
        self.state.lock().unwrap().sessions.insert(session.id.clone(), session);
    }

    /// How many follow-up pages of line items were requested.
    pub fn line_item_requests(&self) -> usize {
        self.state.lock().unwrap().line_item_requests
    }

    /// Every session request received so far.
    pub fn created_sessions(&self) -> Vec<NewCheckoutSession> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn sign(&self, payload: &[u8]) -> String {
        let now = chrono::Utc::now().timestamp();
        webhook::signature_header(STUB_WEBHOOK_SECRET, now, payload).unwrap()
    }
}

impl PaymentGateway for StubGateway {
    async fn create_checkout_session(&self, session: &NewCheckoutSession) -> Result<CheckoutSession, GatewayError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_requests {
            return Err(GatewayError::RequestFailed("Connection refused".into()));
        }
        state.created.push(session.clone());
        let id = format!("cs_test_{}", state.created.len());
        let created = CheckoutSession {
            url: Some(format!("https://checkout.stripe.test/c/pay/{id}")),
            id,
            mode: Some("payment".into()),
            status: Some("open".into()),
            customer_email: session.customer_email.clone(),
            amount_total: session.total().map(|t| t.value()),
            ..Default::default()
        };
        Ok(created)
    }

    async fn retrieve_session_with_line_items(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        let state = self.state.lock().unwrap();
        if state.fail_requests {
            return Err(GatewayError::RequestFailed("Connection refused".into()));
        }
        let mut session = state
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| GatewayError::RequestFailed(format!("No such checkout.session: '{session_id}'")))?;
        if let Some(list) = session.line_items.as_mut() {
            list.has_more = list.data.len() > STUB_PAGE_SIZE;
            list.data.truncate(STUB_PAGE_SIZE);
        }
        Ok(session)
    }

    async fn list_line_items(&self, session_id: &str, starting_after: &str) -> Result<List<LineItem>, GatewayError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_requests {
            return Err(GatewayError::RequestFailed("Connection refused".into()));
        }
        state.line_item_requests += 1;
        let lines = state
            .sessions
            .get(session_id)
            .and_then(|s| s.line_items.as_ref())
            .map(|l| l.data.as_slice())
            .ok_or_else(|| GatewayError::RequestFailed(format!("No such checkout.session: '{session_id}'")))?;
        let start = lines
            .iter()
            .position(|l| l.id == starting_after)
            .map(|i| i + 1)
            .ok_or_else(|| GatewayError::RequestFailed(format!("No such line item: '{starting_after}'")))?;
        let end = (start + STUB_PAGE_SIZE).min(lines.len());
        Ok(List { data: lines[start..end].to_vec(), has_more: end < lines.len(), url: None })
    }

    fn construct_event(&self, payload: &[u8], signature_header: &str) -> Result<Event, GatewayError> {
        let event = webhook::construct_event(payload, signature_header, STUB_WEBHOOK_SECRET, 300)?;
        Ok(event)
    }
}

/// A paid session with expanded line items. Each line is `(vinylId metadata, quantity, unit amount in cents)`.
pub fn completed_session(session_id: &str, email: &str, lines: &[(Option<&str>, i64, i64)]) -> CheckoutSession {
    let data = lines
        .iter()
        .enumerate()
        .map(|(i, (vinyl_id, quantity, unit_amount))| {
            let metadata =
                vinyl_id.map(|v| HashMap::from([("vinylId".to_string(), v.to_string())])).unwrap_or_default();
            LineItem {
                id: format!("li_{i}"),
                description: Some(format!("Record {i}")),
                quantity: Some(*quantity),
                amount_total: quantity * unit_amount,
                currency: Some("usd".into()),
                price: Some(Price {
                    id: format!("price_{i}"),
                    currency: "usd".into(),
                    unit_amount: Some(*unit_amount),
                    product: Some(Expandable::Object(Box::new(Product {
                        id: format!("prod_{i}"),
                        name: format!("Record {i}"),
                        metadata,
                    }))),
                }),
            }
        })
        .collect::<Vec<_>>();
    let total = data.iter().map(|l| l.amount_total).sum();
    CheckoutSession {
        id: session_id.to_string(),
        mode: Some("payment".into()),
        status: Some("complete".into()),
        payment_status: Some("paid".into()),
        customer_email: Some(email.to_string()),
        payment_intent: Some(Expandable::Id(format!("pi_{session_id}"))),
        amount_total: Some(total),
        currency: Some("usd".into()),
        line_items: Some(List { data, ..Default::default() }),
        ..Default::default()
    }
}

/// The JSON body of a webhook delivery of the given type, wrapping `object`.
pub fn event_payload(event_id: &str, event_type: &str, object: serde_json::Value) -> Vec<u8> {
    let event = json!({
        "id": event_id,
        "object": "event",
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": { "object": object }
    });
    event.to_string().into_bytes()
}

/// A `checkout.session.completed` delivery carrying only the bare session, as the provider sends it.
pub fn checkout_completed_payload(event_id: &str, session_id: &str) -> Vec<u8> {
    event_payload(event_id, "checkout.session.completed", json!({ "id": session_id, "object": "checkout.session" }))
}
