//! # Stripe tools
//!
//! A small client for the parts of the Stripe REST API that the vinyl market needs:
//!
//! * Creating hosted checkout sessions ([`StripeApi::create_checkout_session`]).
//! * Retrieving a session with its line items expanded ([`StripeApi::retrieve_session`]), and paging through the rest
//!   of them ([`StripeApi::list_line_items`]).
//! * Verifying and parsing webhook deliveries ([`webhook::construct_event`]).
//!
//! Stripe's request bodies are form-encoded with bracket notation for nested fields. [`NewCheckoutSession`] knows how
//! to flatten itself into that format.
mod api;
mod config;
mod error;

pub mod data_objects;
pub mod webhook;

pub use api::{StripeApi, LINE_ITEM_EXPANSION};
pub use config::StripeConfig;
pub use data_objects::{
    MAX_LINE_ITEM_QUANTITY,
    CheckoutSession,
    CustomerDetails,
    Event,
    EventData,
    EventType,
    Expandable,
    LineItem,
    List,
    NewCheckoutSession,
    NewLineItem,
    PaymentIntent,
    Price,
    Product,
};
pub use error::{SignatureError, StripeApiError};
