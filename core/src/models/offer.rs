// core/src/models/offer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A carousel entry. `product_id` is display-only and may point at a deleted product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Offer {
  pub id: Uuid,
  pub title: String,
  pub image_url: String,
  pub product_id: Option<Uuid>,
  pub active: bool,
  pub order_position: i32,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferInput {
  pub title: String,
  #[serde(default)]
  pub image_url: String,
  #[serde(default)]
  pub product_id: Option<Uuid>,
  #[serde(default = "default_active")]
  pub active: bool,
}

fn default_active() -> bool {
  true
}
