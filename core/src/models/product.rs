// core/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub category: String,
  pub description: String,
  pub price: Decimal,
  /// Never negative. Decremented by fulfillment, set directly by administrators.
  pub stock: i32,
  pub image_url: String,
  pub active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Admin create/update payload. Updates replace every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
  pub name: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub description: String,
  pub price: Decimal,
  pub stock: i32,
  #[serde(default)]
  pub image_url: String,
  #[serde(default = "default_active")]
  pub active: bool,
}

fn default_active() -> bool {
  true
}

/// Listing filter. Results are always newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
  #[serde(default)]
  pub active_only: bool,
  pub category: Option<String>,
}

impl ProductFilter {
  pub fn storefront(category: Option<String>) -> Self {
    Self {
      active_only: true,
      category,
    }
  }

  pub fn matches(&self, product: &Product) -> bool {
    if self.active_only && !product.active {
      return false;
    }
    match &self.category {
      Some(category) => &product.category == category,
      None => true,
    }
  }
}
