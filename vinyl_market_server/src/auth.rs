//! Bearer token handling.
//!
//! Tokens are HS256 JWTs issued by the user service that shares `VMS_JWT_SECRET` with this server. The server only
//! verifies them; [`TokenIssuer`] exists for tooling and tests.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::HeaderMap, FromRequest, HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use vinyl_market_engine::{db_types::Role, traits::Requester};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user id
    pub sub: i64,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

impl JwtClaims {
    pub fn new<S: Into<String>>(user_id: i64, email: S, role: Role, valid_for: Duration) -> Self {
        let exp = (Utc::now() + valid_for).timestamp();
        Self { sub: user_id, email: email.into(), role, exp }
    }

    pub fn requester(&self) -> Requester {
        Requester::new(self.sub, self.role)
    }
}

/// Pulls the claims that [`crate::middleware::JwtMiddlewareFactory`] attached to the request.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned();
        ready(claims.ok_or(ServerError::AuthenticationError(AuthError::MissingToken)))
    }
}

/// Marks a request whose bearer token was present but could not be verified.
#[derive(Debug, Clone)]
pub struct TokenRejection(pub AuthError);

#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { key, validation: Validation::new(Algorithm::HS256) }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "Token has expired".to_string(),
                ErrorKind::InvalidSignature => "Signature verification failed".to_string(),
                _ => e.to_string(),
            };
            debug!("🔐️ Rejected bearer token. {reason}");
            AuthError::InvalidToken(reason)
        })?;
        Ok(data.claims)
    }
}

pub struct TokenIssuer {
    key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes()) }
    }

    pub fn issue_token(&self, claims: &JwtClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.key).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header. `None` if there is no such header.
pub fn bearer_token(headers: &HeaderMap) -> Option<Result<&str, AuthError>> {
    let value = headers.get(actix_web::http::header::AUTHORIZATION)?;
    let result = value
        .to_str()
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
        .and_then(|s| {
            s.strip_prefix("Bearer ")
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AuthError::InvalidToken("Expected a Bearer token".into()))
        });
    Some(result)
}
