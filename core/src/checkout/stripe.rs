// core/src/checkout/stripe.rs

//! Stripe Checkout Sessions over the REST API.

use super::{HostedSession, PaymentProvider, SessionSpec};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, instrument};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Clone)]
pub struct StripeClient {
  http: reqwest::Client,
  secret_key: String,
  api_base: String,
}

impl std::fmt::Debug for StripeClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StripeClient")
      .field("secret_key", &"[REDACTED]")
      .field("api_base", &self.api_base)
      .finish()
  }
}

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
  id: String,
  url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
  error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
  message: Option<String>,
  #[serde(rename = "type")]
  kind: Option<String>,
}

impl StripeClient {
  pub fn new(secret_key: impl Into<String>) -> Self {
    Self {
      http: reqwest::Client::new(),
      secret_key: secret_key.into(),
      api_base: DEFAULT_API_BASE.to_string(),
    }
  }

  pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
    self.api_base = api_base.into().trim_end_matches('/').to_string();
    self
  }
}

/// Form fields for `POST /v1/checkout/sessions`, in Stripe's bracket notation.
pub fn session_form_params(spec: &SessionSpec) -> Vec<(String, String)> {
  let mut params = vec![
    ("mode".to_string(), "payment".to_string()),
    ("payment_method_types[]".to_string(), "card".to_string()),
    ("line_items[0][price_data][currency]".to_string(), spec.currency.clone()),
    (
      "line_items[0][price_data][product_data][name]".to_string(),
      spec.product_name.clone(),
    ),
    (
      "line_items[0][price_data][unit_amount]".to_string(),
      spec.unit_amount.to_string(),
    ),
    ("line_items[0][quantity]".to_string(), spec.quantity.to_string()),
    ("success_url".to_string(), spec.success_url.clone()),
    ("cancel_url".to_string(), spec.cancel_url.clone()),
  ];
  for (key, value) in &spec.metadata {
    params.push((format!("metadata[{}]", key), value.clone()));
  }
  params
}

#[async_trait]
impl PaymentProvider for StripeClient {
  #[instrument(name = "StripeClient::create_session", skip_all, fields(unit_amount = spec.unit_amount), err(Display))]
  async fn create_session(&self, spec: &SessionSpec) -> StoreResult<HostedSession> {
    let endpoint = format!("{}/v1/checkout/sessions", self.api_base);
    let response = self
      .http
      .post(&endpoint)
      .bearer_auth(&self.secret_key)
      .form(&session_form_params(spec))
      .send()
      .await
      .map_err(|e| {
        error!(error = %e, "Stripe request failed to send.");
        StoreError::Provider(format!("Stripe request failed: {}", e))
      })?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| StoreError::Provider(format!("Failed to read Stripe response: {}", e)))?;

    session_from_response(status, &body)
  }
}

/// Maps a `checkout/sessions` response to a hosted session, keeping Stripe's own error message.
pub fn session_from_response(status: reqwest::StatusCode, body: &str) -> StoreResult<HostedSession> {
  if !status.is_success() {
    let message = serde_json::from_str::<StripeErrorEnvelope>(body)
      .ok()
      .and_then(|envelope| {
        debug!(error_type = ?envelope.error.kind, "Stripe returned an error envelope.");
        envelope.error.message
      })
      .unwrap_or_else(|| format!("Stripe responded with status {}", status));
    error!(%status, %message, "Stripe rejected checkout session.");
    return Err(StoreError::Provider(message));
  }

  let session: StripeSessionResponse = serde_json::from_str(body)
    .map_err(|e| StoreError::Provider(format!("Unexpected Stripe response: {}", e)))?;
  let url = session
    .url
    .ok_or_else(|| StoreError::Provider(format!("Stripe session {} has no redirect URL", session.id)))?;

  Ok(HostedSession { id: session.id, url })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeMap;

  fn spec() -> SessionSpec {
    let mut metadata = BTreeMap::new();
    metadata.insert("productId".to_string(), "5b0a7c1e-0000-4000-8000-000000000001".to_string());
    SessionSpec {
      product_name: "Desk Lamp".to_string(),
      unit_amount: 4990,
      currency: "brl".to_string(),
      quantity: 1,
      success_url: "http://localhost:3000/success?session_id={CHECKOUT_SESSION_ID}".to_string(),
      cancel_url: "http://localhost:3000".to_string(),
      metadata,
    }
  }

  fn value_of<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  #[test]
  fn form_params_describe_a_single_card_line_item() {
    let params = session_form_params(&spec());
    assert_eq!(value_of(&params, "mode"), Some("payment"));
    assert_eq!(value_of(&params, "payment_method_types[]"), Some("card"));
    assert_eq!(value_of(&params, "line_items[0][price_data][unit_amount]"), Some("4990"));
    assert_eq!(value_of(&params, "line_items[0][price_data][product_data][name]"), Some("Desk Lamp"));
    assert_eq!(value_of(&params, "line_items[0][quantity]"), Some("1"));
    assert_eq!(
      value_of(&params, "metadata[productId]"),
      Some("5b0a7c1e-0000-4000-8000-000000000001")
    );
  }

  #[test]
  fn successful_response_yields_the_hosted_session() {
    let body = r#"{"id":"cs_test_1","object":"checkout.session","url":"https://checkout.stripe.com/c/pay/cs_test_1"}"#;
    let session = session_from_response(reqwest::StatusCode::OK, body).unwrap();
    assert_eq!(session.id, "cs_test_1");
    assert_eq!(session.url, "https://checkout.stripe.com/c/pay/cs_test_1");
  }

  #[test]
  fn error_envelope_message_is_passed_through_verbatim() {
    let body = r#"{"error":{"type":"invalid_request_error","message":"Invalid API Key provided: sk_test_****1234"}}"#;
    let err = session_from_response(reqwest::StatusCode::UNAUTHORIZED, body).unwrap_err();
    match err {
      StoreError::Provider(message) => assert_eq!(message, "Invalid API Key provided: sk_test_****1234"),
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  fn non_json_failure_falls_back_to_the_status() {
    let err = session_from_response(reqwest::StatusCode::BAD_GATEWAY, "<html>upstream down</html>").unwrap_err();
    match err {
      StoreError::Provider(message) => assert!(message.contains("502"), "message was {}", message),
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  fn session_without_redirect_url_is_a_provider_error() {
    let body = r#"{"id":"cs_test_2","url":null}"#;
    let err = session_from_response(reqwest::StatusCode::OK, body).unwrap_err();
    match err {
      StoreError::Provider(message) => assert!(message.contains("cs_test_2")),
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  fn debug_output_hides_the_secret_key() {
    let client = StripeClient::new("sk_test_very_secret").with_api_base("http://127.0.0.1:9/");
    let printed = format!("{:?}", client);
    assert!(!printed.contains("sk_test_very_secret"));
    assert!(printed.contains("http://127.0.0.1:9"));
  }
}
