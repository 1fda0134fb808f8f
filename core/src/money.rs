// core/src/money.rs

//! Conversions between decimal prices and the provider's smallest currency unit.

use crate::error::{StoreError, StoreResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// `round(price * 100)`, with halves rounded away from zero.
pub fn to_minor_units(price: Decimal) -> StoreResult<i64> {
  let scaled = (price * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
  scaled
    .to_i64()
    .ok_or_else(|| StoreError::Validation(format!("Price {} is out of range", price)))
}

pub fn from_minor_units(amount: i64) -> Decimal {
  Decimal::new(amount, 2)
}
