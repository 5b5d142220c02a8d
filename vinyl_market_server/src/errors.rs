use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::*;
use thiserror::Error;
use vinyl_market_engine::{
    traits::{OrderStoreError, ReviewError, SystemLogError},
    CheckoutError,
    WebhookError,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    WebhookError(#[from] WebhookError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            // Anything but a 2xx tells the payment provider to retry the delivery.
            Self::WebhookError(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Missing bearer token.")]
    MissingToken,
    #[error("Invalid bearer token. {0}")]
    InvalidToken(String),
    #[error("Insufficient permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCart | CheckoutError::InvalidQuantity { .. } | CheckoutError::TotalTooLarge => {
                Self::ValidationError(e.to_string())
            },
            CheckoutError::VinylNotFound(_) => Self::NoRecordFound(e.to_string()),
            CheckoutError::Gateway(ref detail) => {
                error!("💳️ Checkout session could not be created. {detail}");
                Self::BackendError(e.to_string())
            },
            CheckoutError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
        }
    }
}

impl From<ReviewError> for ServerError {
    fn from(e: ReviewError) -> Self {
        match e {
            ReviewError::ValidationError(errors) => Self::ValidationError(errors.join(", ")),
            ReviewError::AlreadyReviewed => Self::ValidationError(e.to_string()),
            ReviewError::VinylNotFound(_) | ReviewError::ReviewNotFound(_) => Self::NoRecordFound(e.to_string()),
            ReviewError::Forbidden => Self::Forbidden(e.to_string()),
            ReviewError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
        }
    }
}

impl From<OrderStoreError> for ServerError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::NotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderStoreError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
        }
    }
}

impl From<SystemLogError> for ServerError {
    fn from(e: SystemLogError) -> Self {
        Self::BackendError(e.to_string())
    }
}
