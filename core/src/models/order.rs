// core/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ORDER_STATUS_COMPLETED: &str = "completed";

/// Written once by fulfillment per completed payment session, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Order {
  pub id: Uuid,
  /// Unique: a session can produce at most one order.
  pub stripe_session_id: String,
  pub product_id: Option<Uuid>,
  pub quantity: i32,
  pub total_amount: Decimal,
  pub status: String,
  pub created_at: DateTime<Utc>,
}

/// Dashboard row: an order joined with its product's current name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct RecentOrder {
  pub id: Uuid,
  pub stripe_session_id: String,
  pub product_id: Option<Uuid>,
  pub product_name: Option<String>,
  pub quantity: i32,
  pub total_amount: Decimal,
  pub status: String,
  pub created_at: DateTime<Utc>,
}
