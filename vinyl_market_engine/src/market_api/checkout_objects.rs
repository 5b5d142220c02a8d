use serde::{Deserialize, Serialize};

use crate::db_types::Currency;

pub const DEFAULT_SUCCESS_URL: &str = "https://example.com/success";
pub const DEFAULT_CANCEL_URL: &str = "https://example.com/cancel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub vinyl_id: i64,
    pub quantity: i64,
}

impl CheckoutItem {
    pub fn new(vinyl_id: i64, quantity: i64) -> Self {
        Self { vinyl_id, quantity }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub currency: Currency,
}

impl CheckoutRequest {
    pub fn new(items: Vec<CheckoutItem>) -> Self {
        Self { items, ..Default::default() }
    }

    pub fn with_customer_email<S: Into<String>>(mut self, email: S) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

/// Where the hosted payment page sends the buyer afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self { success_url: DEFAULT_SUCCESS_URL.to_string(), cancel_url: DEFAULT_CANCEL_URL.to_string() }
    }
}

/// The response to a checkout request. `session_id` holds the URL of the hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionHandle {
    pub session_id: String,
}
