use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::{FromRow, Type};
use thiserror::Error;
pub use vinyl_common::Cents;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------       Rating       ---------------------------------------------------------
/// An average review score in hundredths of a star, i.e. `Rating(450)` is 4.50.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd)]
#[sqlx(transparent)]
pub struct Rating(i64);

impl Rating {
    /// Rounds a mean score to two decimal places, half away from zero. Non-finite input (e.g. the average of an empty
    /// set leaking through as NaN) is treated as zero.
    pub fn from_mean(mean: f64) -> Self {
        if !mean.is_finite() {
            return Self(0);
        }
        #[allow(clippy::cast_possible_truncation)]
        Self((mean * 100.0).round() as i64)
    }

    pub fn hundredths(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl From<i64> for Rating {
    fn from(hundredths: i64) -> Self {
        Self(hundredths)
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

//--------------------------------------        Role        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" | "user" => Ok(Self::User),
            "Admin" | "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid role: {value}. Defaulting to User");
            Role::User
        })
    }
}

//--------------------------------------        User        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl NewUser {
    pub fn new<S: Into<String>>(first_name: S, last_name: S, email: S) -> Self {
        Self { first_name: first_name.into(), last_name: last_name.into(), email: email.into(), role: Role::User }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

//--------------------------------------        Vinyl       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Vinyl {
    pub id: i64,
    pub name: String,
    pub author_name: String,
    pub description: String,
    pub image: Option<String>,
    pub price: Cents,
    pub average_rating: Rating,
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewVinyl {
    pub name: String,
    pub author_name: String,
    pub description: String,
    pub image: Option<String>,
    pub price: Cents,
    pub owner_id: Option<i64>,
}

impl NewVinyl {
    pub fn new<S: Into<String>>(name: S, author_name: S, price: Cents) -> Self {
        Self {
            name: name.into(),
            author_name: author_name.into(),
            description: String::default(),
            image: None,
            price,
            owner_id: None,
        }
    }

    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }
}

//--------------------------------------       Review       ---------------------------------------------------------
pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;
pub const MIN_COMMENT_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub vinyl_id: i64,
    pub score: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub score: i64,
    pub comment: String,
}

impl NewReview {
    pub fn new<S: Into<String>>(score: i64, comment: S) -> Self {
        Self { score, comment: comment.into() }
    }

    /// Returns every rule the review breaks, or `Ok` if there are none.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if !(MIN_SCORE..=MAX_SCORE).contains(&self.score) {
            errors.push(format!("score must be between {MIN_SCORE} and {MAX_SCORE}"));
        }
        if self.comment.trim().chars().count() < MIN_COMMENT_LENGTH {
            errors.push(format!("comment must be at least {MIN_COMMENT_LENGTH} characters long"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub email: String,
    pub stripe_session_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub total_amount: Cents,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub vinyl_id: i64,
    pub quantity: i64,
    /// Unit price at the time of purchase
    pub price: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    /// `None` when the catalog id could not be recovered from the payment provider's line item
    pub vinyl_id: Option<i64>,
    pub quantity: i64,
    pub price: Cents,
}

impl NewOrderItem {
    pub fn new(vinyl_id: Option<i64>, quantity: i64, price: Cents) -> Self {
        Self { vinyl_id, quantity, price }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub email: String,
    pub stripe_session_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub total_amount: Cents,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new<S: Into<String>>(email: S, stripe_session_id: S, total_amount: Cents) -> Self {
        Self {
            email: email.into(),
            stripe_session_id: stripe_session_id.into(),
            stripe_payment_intent_id: None,
            total_amount,
            items: Vec::new(),
        }
    }

    pub fn with_payment_intent<S: Into<String>>(mut self, payment_intent_id: S) -> Self {
        self.stripe_payment_intent_id = Some(payment_intent_id.into());
        self
    }

    pub fn with_item(mut self, item: NewOrderItem) -> Self {
        self.items.push(item);
        self
    }

    /// The items that can be persisted. Lines without a catalog id are dropped.
    pub fn resolved_items(&self) -> impl Iterator<Item = (i64, &NewOrderItem)> {
        self.items.iter().filter_map(|item| item.vinyl_id.map(|id| (id, item)))
    }
}

impl Display for NewOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines = self.items.len();
        write!(f, "Order[{}] for {} ({lines} lines, total {})", self.stripe_session_id, self.email, self.total_amount)
    }
}

//--------------------------------------      Currency      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gel,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
            Currency::Gel => "gel",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usd" => Ok(Self::Usd),
            "eur" => Ok(Self::Eur),
            "gel" => Ok(Self::Gel),
            _ => Err(ConversionError(format!("Unsupported currency: {s}"))),
        }
    }
}

//--------------------------------------     System log     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct SystemLog {
    pub id: i64,
    pub level: LogLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     Pagination     ---------------------------------------------------------
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page: Some(page), limit: Some(limit) }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Rows to skip. Saturates for absurdly large page numbers, which then simply yield an empty page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        let limit = pagination.limit();
        let total_pages = (total + limit - 1) / limit;
        Self { total, page: pagination.page(), limit, total_pages, data }
    }
}
