//! Stripe webhook signature verification.
//!
//! Stripe signs every webhook delivery with the endpoint's signing secret and sends the result in the
//! `Stripe-Signature` header:
//!
//! ```text
//! Stripe-Signature: t=1492774577,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd
//! ```
//!
//! `v1` is the hex-encoded HMAC-SHA256 of `"{t}.{raw body}"`. The body must be the exact bytes that arrived on the
//! wire, so the webhook route has to bypass any JSON extractor. During secret rotation there may be more than one `v1`
//! entry; any match is accepted.
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;

use crate::{Event, SignatureError};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let header = header.trim();
    if header.is_empty() {
        return Err(SignatureError::MissingHeader);
    }
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            return Err(SignatureError::MalformedHeader(format!("'{part}' is not a key=value pair")));
        };
        match key {
            "t" => {
                let t = value
                    .parse::<i64>()
                    .map_err(|e| SignatureError::MalformedHeader(format!("Invalid timestamp '{value}'. {e}")))?;
                timestamp = Some(t);
            },
            // Undecodable signatures are skipped rather than rejected, they simply cannot match.
            "v1" => match hex::decode(value) {
                Ok(sig) => signatures.push(sig),
                Err(e) => trace!("🔐️ Ignoring undecodable v1 signature. {e}"),
            },
            _ => {},
        }
    }
    let timestamp = timestamp.ok_or_else(|| SignatureError::MalformedHeader("No timestamp (t=) found".into()))?;
    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader("No v1 signature found".into()));
    }
    Ok(SignatureHeader { timestamp, signatures })
}

fn signed_payload_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| SignatureError::InvalidSecret(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Computes the `v1` signature Stripe would send for `payload` at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let mac = signed_payload_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Builds a complete `Stripe-Signature` header value. Mostly useful for tests and local tooling.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={timestamp},v1={signature}"))
}

/// Checks the signature header against the raw payload. `now` is the current unix time in seconds, and `tolerance` the
/// maximum age of the signature timestamp.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: i64,
    now: i64,
) -> Result<(), SignatureError> {
    let parsed = parse_header(header)?;
    let mac = signed_payload_mac(secret, parsed.timestamp, payload)?;
    // verify_slice is constant time
    let matched = parsed.signatures.iter().any(|sig| mac.clone().verify_slice(sig).is_ok());
    if !matched {
        return Err(SignatureError::NoMatchingSignature);
    }
    if tolerance > 0 && now.abs_diff(parsed.timestamp) > tolerance.unsigned_abs() {
        let age = now.saturating_sub(parsed.timestamp);
        return Err(SignatureError::TimestampOutOfTolerance { age, tolerance });
    }
    Ok(())
}

/// Verifies the delivery and parses it into an [`Event`].
pub fn construct_event(payload: &[u8], header: &str, secret: &str, tolerance: i64) -> Result<Event, SignatureError> {
    let now = chrono::Utc::now().timestamp();
    verify_signature(payload, header, secret, tolerance, now)?;
    serde_json::from_slice::<Event>(payload).map_err(|e| SignatureError::InvalidPayload(e.to_string()))
}
