// core/src/catalog/validation.rs

use crate::error::{StoreError, StoreResult};
use crate::models::{OfferInput, ProductInput, SettingsUpdate};
use rust_decimal::Decimal;

pub fn validate_product(input: &ProductInput) -> StoreResult<()> {
  if input.name.trim().is_empty() {
    return Err(StoreError::Validation("Product name must not be empty".to_string()));
  }
  if input.price < Decimal::ZERO {
    return Err(StoreError::Validation("Price must not be negative".to_string()));
  }
  validate_stock(input.stock)
}

pub fn validate_stock(stock: i32) -> StoreResult<()> {
  if stock < 0 {
    return Err(StoreError::Validation("Stock must not be negative".to_string()));
  }
  Ok(())
}

pub fn validate_offer(input: &OfferInput) -> StoreResult<()> {
  if input.title.trim().is_empty() {
    return Err(StoreError::Validation("Offer title must not be empty".to_string()));
  }
  Ok(())
}

/// `#RRGGBB`, either case.
pub fn is_hex_color(value: &str) -> bool {
  value.len() == 7 && value.starts_with('#') && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

pub fn validate_settings(update: &SettingsUpdate) -> StoreResult<()> {
  let colors = [
    ("primary_color", &update.primary_color),
    ("secondary_color", &update.secondary_color),
    ("neutral_color", &update.neutral_color),
  ];
  for (field, value) in colors {
    if let Some(color) = value {
      if !is_hex_color(color) {
        return Err(StoreError::Validation(format!("{} must look like #RRGGBB, got '{}'", field, color)));
      }
    }
  }
  if update.store_name.as_deref().is_some_and(|name| name.trim().is_empty()) {
    return Err(StoreError::Validation("Store name must not be empty".to_string()));
  }
  Ok(())
}
