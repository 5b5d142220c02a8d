//! Order notifications.
//!
//! When the webhook processor stores a new order, it publishes an [`OrderCreatedEvent`]. The handlers registered here
//! consume those events on their own task:
//!
//! * A receipt is mailed to the buyer through an HTTP mail relay. Without a relay, the receipt is logged instead.
//! * If Telegram is configured, a short announcement is posted to the store's channel.
//!
//! Failures are logged and recorded in the system log. They never reach the webhook response.
use std::{fmt::Write, time::Duration};

use log::*;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use vinyl_common::Cents;
use vinyl_market_engine::{
    db_types::LogLevel,
    events::{EventHandlers, EventHooks, OrderCreatedEvent},
    market_api::audit,
    SqliteDatabase,
};

use crate::config::{NotificationConfig, TelegramConfig};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const RECEIPT_SUBJECT: &str = "🎉 Payment Successful - Order Confirmation";

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Could not initialize the notification client. {0}")]
    Initialization(String),
    #[error("Notification request failed. {0}")]
    RequestFailed(String),
    #[error("Notification was rejected with status {status}. {message}")]
    Rejected { status: u16, message: String },
}

//--------------------------------------------------   Mail relay   ----------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Clone)]
pub struct MailRelayClient {
    client: Client,
    url: String,
}

impl MailRelayClient {
    pub fn new<S: Into<String>>(url: S) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotificationError::Initialization(e.to_string()))?;
        Ok(Self { client, url: url.into() })
    }

    pub async fn send(&self, message: &MailMessage) -> Result<(), NotificationError> {
        trace!("📧️ Posting mail for {} to relay", message.to);
        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| NotificationError::RequestFailed(e.to_string()))?;
        check_response(response).await
    }
}

//--------------------------------------------------     Telegram     ----------------------------------------------------
#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    url: String,
    channel_id: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotificationError::Initialization(e.to_string()))?;
        let url =
            format!("{}/bot{}/sendMessage", config.api_base.trim_end_matches('/'), config.bot_token.reveal());
        Ok(Self { client, url, channel_id: config.channel_id.clone() })
    }

    pub async fn send_message(&self, text: &str) -> Result<(), NotificationError> {
        let body = SendMessage { chat_id: &self.channel_id, text };
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            // reqwest errors include the url, which contains the bot token
            .map_err(|e| NotificationError::RequestFailed(e.without_url().to_string()))?;
        check_response(response).await
    }
}

async fn check_response(response: reqwest::Response) -> Result<(), NotificationError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(NotificationError::Rejected { status: status.as_u16(), message })
    }
}

//--------------------------------------------------     Messages     ----------------------------------------------------
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Renders the HTML receipt for a new order: one table row per line item, the order total and the checkout session id.
pub fn render_receipt(event: &OrderCreatedEvent) -> String {
    let cell = r#"style="padding: 10px; border-bottom: 1px solid #ddd;""#;
    let mut rows = String::new();
    for item in &event.line_items {
        let description = escape_html(item.description.as_deref().unwrap_or("Item"));
        let quantity = item.quantity.unwrap_or(1);
        let amount = Cents::from(item.amount_total);
        let _ = write!(rows, "<tr><td {cell}>{description}</td><td {cell}>{quantity}</td><td {cell}>{amount}</td></tr>");
    }
    let order = &event.order;
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
<h1 style="color: #4CAF50; text-align: center;">✅ Payment Successful!</h1>
<p>Thank you for your purchase! Your order has been confirmed.</p>
<h2>Order Details</h2>
<p><strong>Order ID:</strong> {session}</p>
<p><strong>Payment Status:</strong> Paid</p>
<table style="width: 100%; border-collapse: collapse;">
<thead><tr><th>Item</th><th>Quantity</th><th>Price</th></tr></thead>
<tbody>{rows}</tbody>
<tfoot><tr><td colspan="2" style="text-align: right; font-weight: bold;">Total:</td><td style="font-weight: bold;">{total}</td></tr></tfoot>
</table>
</div>"#,
        session = escape_html(&order.stripe_session_id),
        total = order.total_amount,
    )
}

pub fn receipt_message(from: &str, event: &OrderCreatedEvent) -> MailMessage {
    MailMessage {
        from: from.to_string(),
        to: event.order.email.clone(),
        subject: RECEIPT_SUBJECT.to_string(),
        html: render_receipt(event),
    }
}

pub fn broadcast_text(event: &OrderCreatedEvent) -> String {
    let count: i64 = event.items.iter().map(|i| i.quantity).sum();
    let currency = event.currency.to_uppercase();
    format!("🎵 New order #{}\nRecords: {count}\nTotal: {} {currency}", event.order.id, event.order.total_amount)
}

//--------------------------------------------------     Handlers     ----------------------------------------------------
async fn deliver_receipt(mailer: Option<&MailRelayClient>, message: MailMessage, db: &SqliteDatabase) {
    let Some(mailer) = mailer else {
        info!("📧️ No mail relay configured. Receipt for {}:\n{}", message.to, message.html);
        return;
    };
    match mailer.send(&message).await {
        Ok(()) => {
            info!("📧️ Receipt sent to {}", message.to);
            audit::record(db, LogLevel::Info, &format!("Success email sent to: {}", message.to)).await;
        },
        Err(e) => {
            error!("📧️ Could not send receipt to {}. {e}", message.to);
            audit::record(db, LogLevel::Error, &format!("Error sending success email to {}: {e}", message.to)).await;
        },
    }
}

/// Builds the event handlers for order notifications. The caller starts them with
/// [`EventHandlers::start_handlers`] and hands [`EventHandlers::producers`] to the webhook processor.
pub fn create_notification_handlers(
    config: NotificationConfig,
    buffer_size: usize,
    db: SqliteDatabase,
) -> Result<EventHandlers, NotificationError> {
    let mut hooks = EventHooks::default();
    let mailer = config.mail_relay_url.as_deref().map(MailRelayClient::new).transpose()?;
    let telegram = config.telegram.as_ref().map(TelegramClient::new).transpose()?;
    let from = config.mail_from;
    hooks.on_order_created(move |ev| {
        let mailer = mailer.clone();
        let telegram = telegram.clone();
        let db = db.clone();
        let receipt = receipt_message(&from, &ev);
        let text = broadcast_text(&ev);
        let order_id = ev.order.id;
        Box::pin(async move {
            deliver_receipt(mailer.as_ref(), receipt, &db).await;
            if let Some(telegram) = telegram {
                match telegram.send_message(&text).await {
                    Ok(()) => info!("📧️ Order #{order_id} announced on Telegram"),
                    Err(e) => error!("📧️ Could not announce order #{order_id} on Telegram. {e}"),
                }
            }
        })
    });
    Ok(EventHandlers::new(buffer_size, hooks))
}
