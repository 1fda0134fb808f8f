// core/src/catalog/mod.rs

//! Catalog, carousel, settings and reporting operations used by the storefront
//! and the admin API. Input is validated here; stores trust what they receive.

pub mod ordering;
pub mod validation;

use crate::error::{StoreError, StoreResult};
use crate::models::{Offer, OfferInput, Order, Product, ProductFilter, ProductInput, SettingsUpdate, StoreSettings};
use crate::store::{DashboardQuery, DashboardStats, OfferStore, OrderStore, ProductStore, ReportingStore, SettingsStore, StorefrontStore};
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub use ordering::{reorder_positions, MoveDirection};

/// Products at or below this stock count show up as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;
pub const DASHBOARD_ORDER_WINDOW_DAYS: i64 = 7;
pub const DASHBOARD_LATEST_ORDERS: i64 = 5;

/// Everything the public storefront page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorefrontPage {
  pub settings: StoreSettings,
  pub products: Vec<Product>,
  /// Empty when the carousel is switched off.
  pub offers: Vec<Offer>,
}

#[derive(Clone)]
pub struct Catalog {
  store: Arc<dyn StorefrontStore>,
}

impl Catalog {
  pub fn new(store: Arc<dyn StorefrontStore>) -> Self {
    Self { store }
  }

  // --- Products ---

  pub async fn storefront_products(&self, category: Option<String>) -> StoreResult<Vec<Product>> {
    let category = category.filter(|c| !c.trim().is_empty());
    self.store.list_products(&ProductFilter::storefront(category)).await
  }

  /// Inactive products are hidden from shoppers.
  pub async fn active_product(&self, id: Uuid) -> StoreResult<Product> {
    self
      .store
      .get_product(id)
      .await?
      .filter(|p| p.active)
      .ok_or_else(|| product_not_found(id))
  }

  pub async fn all_products(&self) -> StoreResult<Vec<Product>> {
    self.store.list_products(&ProductFilter::default()).await
  }

  #[instrument(skip_all, fields(name = %input.name), err(Display))]
  pub async fn create_product(&self, input: ProductInput) -> StoreResult<Product> {
    validation::validate_product(&input)?;
    let product = self.store.create_product(&input).await?;
    info!(product_id = %product.id, "Product created.");
    Ok(product)
  }

  #[instrument(skip(self, input), err(Display))]
  pub async fn update_product(&self, id: Uuid, input: ProductInput) -> StoreResult<Product> {
    validation::validate_product(&input)?;
    self.store.update_product(id, &input).await?.ok_or_else(|| product_not_found(id))
  }

  #[instrument(skip(self), err(Display))]
  pub async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
    if !self.store.delete_product(id).await? {
      return Err(product_not_found(id));
    }
    info!("Product deleted.");
    Ok(())
  }

  #[instrument(skip(self), err(Display))]
  pub async fn set_stock(&self, id: Uuid, stock: i32) -> StoreResult<Product> {
    validation::validate_stock(stock)?;
    self.store.set_stock(id, stock).await?.ok_or_else(|| product_not_found(id))
  }

  // --- Offers ---

  pub async fn active_offers(&self) -> StoreResult<Vec<Offer>> {
    self.store.list_offers(true).await
  }

  pub async fn all_offers(&self) -> StoreResult<Vec<Offer>> {
    self.store.list_offers(false).await
  }

  #[instrument(skip_all, fields(title = %input.title), err(Display))]
  pub async fn create_offer(&self, input: OfferInput) -> StoreResult<Offer> {
    validation::validate_offer(&input)?;
    let offer = self.store.create_offer(&input).await?;
    info!(offer_id = %offer.id, position = offer.order_position, "Offer created.");
    Ok(offer)
  }

  #[instrument(skip(self, input), err(Display))]
  pub async fn update_offer(&self, id: Uuid, input: OfferInput) -> StoreResult<Offer> {
    validation::validate_offer(&input)?;
    self.store.update_offer(id, &input).await?.ok_or_else(|| offer_not_found(id))
  }

  #[instrument(skip(self), err(Display))]
  pub async fn delete_offer(&self, id: Uuid) -> StoreResult<()> {
    if !self.store.delete_offer(id).await? {
      return Err(offer_not_found(id));
    }
    Ok(())
  }

  /// Moves an offer one slot and returns the carousel in its new order.
  /// At either edge nothing changes.
  #[instrument(skip(self), err(Display))]
  pub async fn move_offer(&self, id: Uuid, direction: MoveDirection) -> StoreResult<Vec<Offer>> {
    let offers = self.store.list_offers(false).await?;
    let ordered: Vec<Uuid> = offers.iter().map(|o| o.id).collect();
    if !ordered.contains(&id) {
      return Err(offer_not_found(id));
    }

    match reorder_positions(&ordered, id, direction) {
      Some(positions) => {
        self.store.set_offer_positions(&positions).await?;
        info!("Offer moved; positions renumbered.");
        self.store.list_offers(false).await
      }
      None => Ok(offers),
    }
  }

  // --- Settings ---

  pub async fn settings(&self) -> StoreResult<StoreSettings> {
    self.store.get_settings().await
  }

  #[instrument(skip_all, err(Display))]
  pub async fn update_settings(&self, update: SettingsUpdate) -> StoreResult<StoreSettings> {
    validation::validate_settings(&update)?;
    let settings = self.store.update_settings(&update).await?;
    info!(store_name = %settings.store_name, "Store settings updated.");
    Ok(settings)
  }

  pub async fn storefront_page(&self) -> StoreResult<StorefrontPage> {
    let settings = self.store.get_settings().await?;
    let products = self.store.list_products(&ProductFilter::storefront(None)).await?;
    let offers = if settings.show_offers {
      self.store.list_offers(true).await?
    } else {
      Vec::new()
    };
    Ok(StorefrontPage {
      settings,
      products,
      offers,
    })
  }

  // --- Orders & reporting ---

  pub async fn order_for_session(&self, session_id: &str) -> StoreResult<Order> {
    self
      .store
      .find_order_by_session(session_id)
      .await?
      .ok_or_else(|| StoreError::NotFound(format!("No order for session {}", session_id)))
  }

  pub async fn dashboard(&self) -> StoreResult<DashboardStats> {
    let query = DashboardQuery {
      low_stock_threshold: LOW_STOCK_THRESHOLD,
      orders_since: Utc::now() - Duration::days(DASHBOARD_ORDER_WINDOW_DAYS),
      latest_limit: DASHBOARD_LATEST_ORDERS,
    };
    self.store.dashboard_stats(&query).await
  }
}

fn product_not_found(id: Uuid) -> StoreError {
  StoreError::NotFound(format!("Product {} not found", id))
}

fn offer_not_found(id: Uuid) -> StoreError {
  StoreError::NotFound(format!("Offer {} not found", id))
}
