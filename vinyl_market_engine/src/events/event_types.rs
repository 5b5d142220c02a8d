use stripe_tools::LineItem;

use crate::db_types::{Currency, Order, OrderItem};

/// Emitted once for every order materialised from a completed checkout session. Redelivered sessions do not emit it
/// again.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderCreatedEvent {
    pub order: Order,
    /// The stored items. Line items whose vinyl could not be identified are absent here.
    pub items: Vec<OrderItem>,
    /// The line items as the payment provider reported them, for receipts.
    pub line_items: Vec<LineItem>,
    /// Lowercase ISO code of the currency the session was paid in.
    pub currency: String,
}

impl OrderCreatedEvent {
    pub fn new(order: Order, items: Vec<OrderItem>, line_items: Vec<LineItem>) -> Self {
        Self { order, items, line_items, currency: Currency::default().code().to_string() }
    }

    pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.currency = currency.into().to_ascii_lowercase();
        self
    }
}
