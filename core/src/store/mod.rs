// core/src/store/mod.rs

//! Storage traits for the storefront.
//!
//! The traits are object safe (`async_trait`) so the application can hold an
//! `Arc<dyn StorefrontStore>` and swap PostgreSQL for the in-memory store in tests.
//! Stores do not validate input; `crate::catalog` does that before calling them.

pub mod in_memory;

use crate::error::StoreResult;
use crate::models::{
  Offer, OfferInput, Order, Product, ProductFilter, ProductInput, RecentOrder, SettingsUpdate, StoreSettings,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub use in_memory::InMemoryStore;

#[async_trait]
pub trait ProductStore: Send + Sync {
  /// Products matching `filter`, newest first.
  async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
  async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>>;
  async fn create_product(&self, input: &ProductInput) -> StoreResult<Product>;
  async fn update_product(&self, id: Uuid, input: &ProductInput) -> StoreResult<Option<Product>>;
  async fn delete_product(&self, id: Uuid) -> StoreResult<bool>;
  async fn set_stock(&self, id: Uuid, stock: i32) -> StoreResult<Option<Product>>;
}

#[async_trait]
pub trait OfferStore: Send + Sync {
  /// Offers ordered by `order_position`.
  async fn list_offers(&self, active_only: bool) -> StoreResult<Vec<Offer>>;
  async fn get_offer(&self, id: Uuid) -> StoreResult<Option<Offer>>;
  /// Appends the offer after every existing one.
  async fn create_offer(&self, input: &OfferInput) -> StoreResult<Offer>;
  /// Position is left unchanged.
  async fn update_offer(&self, id: Uuid, input: &OfferInput) -> StoreResult<Option<Offer>>;
  async fn delete_offer(&self, id: Uuid) -> StoreResult<bool>;
  /// Writes all positions atomically.
  async fn set_offer_positions(&self, positions: &[(Uuid, i32)]) -> StoreResult<()>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
  async fn get_settings(&self) -> StoreResult<StoreSettings>;
  async fn update_settings(&self, update: &SettingsUpdate) -> StoreResult<StoreSettings>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn find_order_by_session(&self, session_id: &str) -> StoreResult<Option<Order>>;

  /// Decrements stock by one and records the order in one atomic unit.
  ///
  /// Must be a no-op returning `AlreadyRecorded` when an order for
  /// `request.session_id` exists, and must never take stock below zero.
  async fn fulfill_checkout(&self, request: &FulfillmentRequest) -> StoreResult<FulfillmentOutcome>;
}

#[async_trait]
pub trait ReportingStore: Send + Sync {
  async fn dashboard_stats(&self, query: &DashboardQuery) -> StoreResult<DashboardStats>;
}

/// Everything the application needs from one backend.
pub trait StorefrontStore: ProductStore + OfferStore + SettingsStore + OrderStore + ReportingStore {}

impl<T> StorefrontStore for T where T: ProductStore + OfferStore + SettingsStore + OrderStore + ReportingStore {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentRequest {
  pub session_id: String,
  pub product_id: Uuid,
  /// `amount_total` reported by the provider in minor units; the product price is used when absent.
  pub amount_minor: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FulfillmentOutcome {
  Recorded(Order),
  AlreadyRecorded(Order),
  ProductMissing,
  OutOfStock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
  pub low_stock_threshold: i32,
  pub orders_since: DateTime<Utc>,
  pub latest_limit: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
  pub total_products: i64,
  pub low_stock_products: i64,
  pub recent_orders: i64,
  pub active_offers: i64,
  pub latest_orders: Vec<RecentOrder>,
}
