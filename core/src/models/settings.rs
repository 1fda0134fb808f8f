// core/src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The storefront's appearance. Exactly one row exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct StoreSettings {
  pub id: Uuid,
  pub primary_color: String,
  pub secondary_color: String,
  pub neutral_color: String,
  pub store_name: String,
  pub store_description: String,
  pub show_offers: bool,
  pub show_featured: bool,
  pub updated_at: DateTime<Utc>,
}

impl StoreSettings {
  /// The row a fresh store starts with.
  pub fn initial() -> Self {
    Self {
      id: Uuid::new_v4(),
      primary_color: "#1f3048".to_string(),
      secondary_color: "#18b4dd".to_string(),
      neutral_color: "#f5f8f9".to_string(),
      store_name: "ALI Commerce".to_string(),
      store_description: "Your complete online store".to_string(),
      show_offers: true,
      show_featured: true,
      updated_at: Utc::now(),
    }
  }

  pub fn apply(&mut self, update: &SettingsUpdate) {
    if let Some(v) = &update.primary_color {
      self.primary_color = v.clone();
    }
    if let Some(v) = &update.secondary_color {
      self.secondary_color = v.clone();
    }
    if let Some(v) = &update.neutral_color {
      self.neutral_color = v.clone();
    }
    if let Some(v) = &update.store_name {
      self.store_name = v.clone();
    }
    if let Some(v) = &update.store_description {
      self.store_description = v.clone();
    }
    if let Some(v) = update.show_offers {
      self.show_offers = v;
    }
    if let Some(v) = update.show_featured {
      self.show_featured = v;
    }
    self.updated_at = Utc::now();
  }
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
  pub primary_color: Option<String>,
  pub secondary_color: Option<String>,
  pub neutral_color: Option<String>,
  pub store_name: Option<String>,
  pub store_description: Option<String>,
  pub show_offers: Option<bool>,
  pub show_featured: Option<bool>,
}
