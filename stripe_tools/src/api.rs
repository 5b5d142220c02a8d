use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    config::StripeConfig,
    webhook,
    CheckoutSession,
    Event,
    LineItem,
    List,
    NewCheckoutSession,
    SignatureError,
    StripeApiError,
};

/// The line-item expansion needed to rebuild an order from a completed session.
pub const LINE_ITEM_EXPANSION: [&str; 2] = ["line_items", "line_items.data.price.product"];
/// The largest page Stripe returns from list endpoints.
pub const MAX_PAGE_LIMIT: &str = "100";

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let mut val = HeaderValue::from_str(&format!("Bearer {}", config.secret_key.reveal()))
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }

    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        form: Option<&[(String, String)]>,
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("💳️ Sending Stripe request: {method} {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(form) = form {
            req = req.form(form);
        }
        let response = req.send().await.map_err(|e| StripeApiError::RestRequestError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ Stripe request successful. {status}");
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let text = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            let message = match serde_json::from_str::<StripeErrorBody>(&text) {
                Ok(StripeErrorBody { error }) => format!(
                    "{} ({})",
                    error.message.unwrap_or_else(|| "No message".into()),
                    error.error_type.unwrap_or_else(|| "unknown_error".into())
                ),
                Err(_) => text,
            };
            Err(StripeApiError::QueryError { status: status.as_u16(), message })
        }
    }

    /// Opens a hosted checkout session. The returned session carries the redirect `url` for the buyer.
    pub async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
    ) -> Result<CheckoutSession, StripeApiError> {
        let form = session.to_form_params();
        debug!("💳️ Creating checkout session with {} line items", session.line_items.len());
        let result = self.rest_query::<CheckoutSession>(Method::POST, "/checkout/sessions", &[], Some(&form)).await?;
        info!("💳️ Created checkout session {}", result.id);
        Ok(result)
    }

    /// Fetches a checkout session, expanding the given fields (e.g. [`LINE_ITEM_EXPANSION`]).
    pub async fn retrieve_session(&self, session_id: &str, expand: &[&str]) -> Result<CheckoutSession, StripeApiError> {
        let path = format!("/checkout/sessions/{session_id}");
        let params = expand.iter().map(|e| ("expand[]", *e)).collect::<Vec<_>>();
        debug!("💳️ Fetching checkout session {session_id}");
        self.rest_query::<CheckoutSession>(Method::GET, &path, &params, None).await
    }

    /// Fetches one page of a session's line items, with products expanded, starting after the line item with id
    /// `starting_after`.
    ///
    /// An expanded `line_items` list on the session only holds the first page. Keep calling this while
    /// [`List::has_more`] is set.
    pub async fn list_line_items(
        &self,
        session_id: &str,
        starting_after: &str,
    ) -> Result<List<LineItem>, StripeApiError> {
        let path = format!("/checkout/sessions/{session_id}/line_items");
        let params =
            [("expand[]", "data.price.product"), ("limit", MAX_PAGE_LIMIT), ("starting_after", starting_after)];
        debug!("💳️ Fetching line items of session {session_id} after {starting_after}");
        self.rest_query::<List<LineItem>>(Method::GET, &path, &params, None).await
    }

    /// Verifies a webhook delivery with the configured endpoint secret.
    pub fn construct_event(&self, payload: &[u8], signature_header: &str) -> Result<Event, SignatureError> {
        webhook::construct_event(
            payload,
            signature_header,
            self.config.webhook_secret.reveal(),
            self.config.webhook_tolerance,
        )
    }
}
