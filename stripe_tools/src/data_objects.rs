use std::collections::{BTreeMap, HashMap};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use vinyl_common::Cents;

//--------------------------------------   Expandable   ---------------------------------------------------------
/// Stripe returns related objects either as a bare id, or as the full object when the request asked for it via
/// `expand[]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Object(Box<T>),
    Id(String),
}

impl<T> Expandable<T> {
    pub fn as_object(&self) -> Option<&T> {
        match self {
            Self::Object(o) => Some(o.as_ref()),
            Self::Id(_) => None,
        }
    }
}

impl Expandable<PaymentIntent> {
    pub fn id(&self) -> &str {
        match self {
            Self::Object(pi) => pi.id.as_str(),
            Self::Id(id) => id.as_str(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub url: Option<String>,
}

//--------------------------------------   Checkout objects   ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub id: String,
    #[serde(default)]
    pub currency: String,
    /// Minor currency units
    pub unit_amount: Option<i64>,
    pub product: Option<Expandable<Product>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    #[serde(default)]
    pub amount_total: i64,
    pub currency: Option<String>,
    pub price: Option<Price>,
}

impl LineItem {
    /// The product, if the line item was fetched with `line_items.data.price.product` expanded.
    pub fn product(&self) -> Option<&Product> {
        self.price.as_ref().and_then(|p| p.product.as_ref()).and_then(|p| p.as_object())
    }

    pub fn product_metadata(&self, key: &str) -> Option<&str> {
        self.product().and_then(|p| p.metadata.get(key)).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// The hosted payment page. Only present while the session is open.
    pub url: Option<String>,
    pub mode: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub customer_email: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub payment_intent: Option<Expandable<PaymentIntent>>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub line_items: Option<List<LineItem>>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// The buyer's email. Sessions created with `customer_email` carry it directly; otherwise Stripe records what the
    /// buyer typed into the payment page under `customer_details`.
    pub fn email(&self) -> Option<&str> {
        self.customer_email
            .as_deref()
            .or_else(|| self.customer_details.as_ref().and_then(|d| d.email.as_deref()))
    }

    pub fn payment_intent_id(&self) -> Option<&str> {
        self.payment_intent.as_ref().map(|pi| pi.id())
    }

    pub fn line_items(&self) -> &[LineItem] {
        self.line_items.as_ref().map(|l| l.data.as_slice()).unwrap_or_default()
    }
}

//--------------------------------------   NewCheckoutSession   --------------------------------------------------------
/// Stripe refuses line items with a larger quantity.
pub const MAX_LINE_ITEM_QUANTITY: i64 = 999_999;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub name: String,
    pub currency: String,
    pub unit_amount: Cents,
    pub quantity: i64,
    pub image: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckoutSession {
    pub line_items: Vec<NewLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
}

impl NewCheckoutSession {
    /// The sum of `unit_amount * quantity` over all line items, or `None` if it does not fit in an `i64`.
    pub fn total(&self) -> Option<Cents> {
        self.line_items.iter().try_fold(Cents::default(), |acc, li| {
            li.unit_amount.checked_mul(li.quantity).and_then(|line_total| acc.checked_add(line_total))
        })
    }

    /// Flattens the session into Stripe's form encoding, e.g. `line_items[0][price_data][unit_amount]=2999`.
    pub fn to_form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];
        if let Some(email) = &self.customer_email {
            params.push(("customer_email".to_string(), email.clone()));
        }
        for (i, item) in self.line_items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            params.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
            params.push((format!("{prefix}[price_data][currency]"), item.currency.clone()));
            params.push((format!("{prefix}[price_data][unit_amount]"), item.unit_amount.value().to_string()));
            params.push((format!("{prefix}[price_data][product_data][name]"), item.name.clone()));
            if let Some(image) = &item.image {
                params.push((format!("{prefix}[price_data][product_data][images][0]"), image.clone()));
            }
            for (k, v) in &item.metadata {
                params.push((format!("{prefix}[price_data][product_data][metadata][{k}]"), v.clone()));
            }
        }
        params
    }
}

//--------------------------------------        Events        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    CheckoutSessionCompleted,
    PaymentIntentSucceeded,
    Other(String),
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        match value {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub object: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub livemode: bool,
    pub data: EventData,
}

impl Event {
    pub fn kind(&self) -> EventType {
        EventType::from(self.event_type.as_str())
    }

    /// Deserializes `data.object` into a concrete Stripe object.
    pub fn data_object<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}
