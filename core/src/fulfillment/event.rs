// core/src/fulfillment/event.rs

//! The subset of provider event JSON the fulfillment path reads.

use crate::checkout::PRODUCT_ID_METADATA_KEY;
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(rename = "type")]
  pub event_type: String,
  pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
  pub object: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSessionObject {
  pub id: String,
  #[serde(default)]
  pub amount_total: Option<i64>,
  #[serde(default)]
  pub metadata: Option<BTreeMap<String, String>>,
}

impl CheckoutSessionObject {
  /// The product tagged at checkout, if present and well formed.
  pub fn product_id(&self) -> Option<Uuid> {
    self
      .metadata
      .as_ref()?
      .get(PRODUCT_ID_METADATA_KEY)
      .and_then(|raw| Uuid::parse_str(raw).ok())
  }
}
