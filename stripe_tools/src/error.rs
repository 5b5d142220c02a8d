use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Stripe request failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("No stripe-signature header was provided")]
    MissingHeader,
    #[error("The stripe-signature header is malformed: {0}")]
    MalformedHeader(String),
    #[error("No signatures found matching the expected signature for payload")]
    NoMatchingSignature,
    #[error("Timestamp outside the tolerance zone ({age}s old, tolerance is {tolerance}s)")]
    TimestampOutOfTolerance { age: i64, tolerance: i64 },
    #[error("The webhook signing secret cannot be used as an HMAC key. {0}")]
    InvalidSecret(String),
    #[error("The webhook payload is not a valid Stripe event. {0}")]
    InvalidPayload(String),
}
