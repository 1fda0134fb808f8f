// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use storefront_core::checkout::{CheckoutSettings, HostedSession, PaymentProvider, SessionSpec};
use storefront_core::models::{Product, ProductInput};
use storefront_core::store::{InMemoryStore, ProductStore};
use storefront_core::{StoreError, StoreResult, WebhookVerifier};
use tracing::Level;
use uuid::Uuid;

pub const WEBHOOK_SECRET: &str = "whsec_test_fulfillment_secret";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn dec(s: &str) -> Decimal {
  Decimal::from_str(s).unwrap()
}

pub fn checkout_settings() -> CheckoutSettings {
  CheckoutSettings {
    currency: "brl".to_string(),
    public_base_url: "http://localhost:3000".to_string(),
  }
}

pub fn product_input(name: &str, price: &str, stock: i32) -> ProductInput {
  ProductInput {
    name: name.to_string(),
    category: "lighting".to_string(),
    description: format!("{} for tests", name),
    price: dec(price),
    stock,
    image_url: String::new(),
    active: true,
  }
}

pub async fn seed_product(store: &InMemoryStore, name: &str, price: &str, stock: i32) -> Product {
  store.create_product(&product_input(name, price, stock)).await.unwrap()
}

pub async fn stock_of(store: &InMemoryStore, id: Uuid) -> i32 {
  store.get_product(id).await.unwrap().unwrap().stock
}

/// A payment provider that records what it was asked and answers from a script.
#[derive(Default)]
pub struct RecordingProvider {
  pub calls: Mutex<Vec<SessionSpec>>,
  pub reject_with: Option<String>,
}

impl RecordingProvider {
  pub fn rejecting(message: &str) -> Self {
    Self {
      calls: Mutex::new(Vec::new()),
      reject_with: Some(message.to_string()),
    }
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().len()
  }
}

#[async_trait]
impl PaymentProvider for RecordingProvider {
  async fn create_session(&self, spec: &SessionSpec) -> StoreResult<HostedSession> {
    let n = {
      let mut calls = self.calls.lock();
      calls.push(spec.clone());
      calls.len()
    };
    if let Some(message) = &self.reject_with {
      return Err(StoreError::Provider(message.clone()));
    }
    Ok(HostedSession {
      id: format!("cs_test_{}", n),
      url: format!("https://checkout.stripe.test/pay/cs_test_{}", n),
    })
  }
}

pub fn provider(p: RecordingProvider) -> Arc<RecordingProvider> {
  Arc::new(p)
}

pub fn verifier() -> WebhookVerifier {
  WebhookVerifier::new(WEBHOOK_SECRET)
}

pub fn completed_event(session_id: &str, product_id: Uuid, amount_total: Option<i64>) -> Vec<u8> {
  let mut object = json!({
    "id": session_id,
    "object": "checkout.session",
    "payment_status": "paid",
    "metadata": { "productId": product_id.to_string() }
  });
  if let Some(amount) = amount_total {
    object["amount_total"] = json!(amount);
  }
  serde_json::to_vec(&json!({
    "id": format!("evt_{}", session_id),
    "type": "checkout.session.completed",
    "data": { "object": object }
  }))
  .unwrap()
}

pub fn event_of_type(event_type: &str) -> Vec<u8> {
  serde_json::to_vec(&json!({
    "id": "evt_other",
    "type": event_type,
    "data": { "object": { "id": "pi_123" } }
  }))
  .unwrap()
}

pub fn sign(payload: &[u8], at: DateTime<Utc>) -> String {
  verifier().sign(payload, at.timestamp()).unwrap()
}
