use std::env;

use log::*;
use vinyl_common::Secret;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
/// Stripe's own libraries reject signatures older than five minutes.
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    pub api_base: String,
    pub secret_key: Secret<String>,
    pub webhook_secret: Secret<String>,
    /// Maximum accepted age, in seconds, of a webhook signature timestamp.
    pub webhook_tolerance: i64,
    pub request_timeout: u64,
}

impl StripeConfig {
    pub fn new(secret_key: &str, webhook_secret: &str) -> Self {
        Self {
            api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            secret_key: Secret::new(secret_key.to_string()),
            webhook_secret: Secret::new(webhook_secret.to_string()),
            webhook_tolerance: DEFAULT_WEBHOOK_TOLERANCE_SECS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn new_from_env_or_default() -> Self {
        let api_base = env::var("STRIPE_API_BASE").unwrap_or_else(|_| {
            debug!("🪛️ STRIPE_API_BASE not set, using {DEFAULT_STRIPE_API_BASE}");
            DEFAULT_STRIPE_API_BASE.to_string()
        });
        let secret_key = Secret::new(env::var("STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ STRIPE_SECRET_KEY not set, using (probably useless) default. Checkout sessions will fail.");
            "sk_test_000000000000".to_string()
        }));
        let webhook_secret = Secret::new(env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ STRIPE_WEBHOOK_SECRET not set, using (probably useless) default. Webhooks will be rejected.");
            "whsec_000000000000".to_string()
        }));
        let webhook_tolerance = env::var("STRIPE_WEBHOOK_TOLERANCE")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid value for STRIPE_WEBHOOK_TOLERANCE: {s}. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_WEBHOOK_TOLERANCE_SECS);
        Self {
            api_base,
            secret_key,
            webhook_secret,
            webhook_tolerance,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
