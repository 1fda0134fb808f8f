// core/src/store/in_memory.rs

//! A process-local store. Every operation takes one lock, which makes
//! `fulfill_checkout` atomic in the same way a database transaction is.

use super::{
  DashboardQuery, DashboardStats, FulfillmentOutcome, FulfillmentRequest, OfferStore, OrderStore, ProductStore,
  ReportingStore, SettingsStore,
};
use crate::error::{StoreError, StoreResult};
use crate::models::{
  Offer, OfferInput, Order, Product, ProductFilter, ProductInput, RecentOrder, SettingsUpdate, StoreSettings,
  ORDER_STATUS_COMPLETED,
};
use crate::money::from_minor_units;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::cmp::Reverse;
use uuid::Uuid;

#[derive(Debug, Default)]
struct InMemoryState {
  products: Vec<Product>,
  offers: Vec<Offer>,
  settings: Option<StoreSettings>,
  orders: Vec<Order>,
}

#[derive(Debug)]
pub struct InMemoryStore {
  state: RwLock<InMemoryState>,
}

impl InMemoryStore {
  /// A store holding the initial settings row and nothing else.
  pub fn new() -> Self {
    Self {
      state: RwLock::new(InMemoryState {
        settings: Some(StoreSettings::initial()),
        ..Default::default()
      }),
    }
  }

  /// A store whose settings row is missing, as after a botched migration.
  pub fn without_settings() -> Self {
    Self {
      state: RwLock::new(InMemoryState::default()),
    }
  }

  pub fn order_count(&self) -> usize {
    self.state.read().orders.len()
  }
}

impl Default for InMemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl ProductStore for InMemoryStore {
  async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
    let state = self.state.read();
    // Reverse first so products created in the same instant still list newest first.
    let mut products: Vec<Product> = state.products.iter().rev().filter(|p| filter.matches(p)).cloned().collect();
    products.sort_by_key(|p| Reverse(p.created_at));
    Ok(products)
  }

  async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    Ok(self.state.read().products.iter().find(|p| p.id == id).cloned())
  }

  async fn create_product(&self, input: &ProductInput) -> StoreResult<Product> {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      name: input.name.clone(),
      category: input.category.clone(),
      description: input.description.clone(),
      price: input.price,
      stock: input.stock,
      image_url: input.image_url.clone(),
      active: input.active,
      created_at: now,
      updated_at: now,
    };
    self.state.write().products.push(product.clone());
    Ok(product)
  }

  async fn update_product(&self, id: Uuid, input: &ProductInput) -> StoreResult<Option<Product>> {
    let mut state = self.state.write();
    let Some(product) = state.products.iter_mut().find(|p| p.id == id) else {
      return Ok(None);
    };
    product.name = input.name.clone();
    product.category = input.category.clone();
    product.description = input.description.clone();
    product.price = input.price;
    product.stock = input.stock;
    product.image_url = input.image_url.clone();
    product.active = input.active;
    product.updated_at = Utc::now();
    Ok(Some(product.clone()))
  }

  async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
    let mut state = self.state.write();
    let before = state.products.len();
    state.products.retain(|p| p.id != id);
    if state.products.len() == before {
      return Ok(false);
    }
    // Same effect as ON DELETE SET NULL.
    for offer in state.offers.iter_mut().filter(|o| o.product_id == Some(id)) {
      offer.product_id = None;
    }
    for order in state.orders.iter_mut().filter(|o| o.product_id == Some(id)) {
      order.product_id = None;
    }
    Ok(true)
  }

  async fn set_stock(&self, id: Uuid, stock: i32) -> StoreResult<Option<Product>> {
    let mut state = self.state.write();
    let Some(product) = state.products.iter_mut().find(|p| p.id == id) else {
      return Ok(None);
    };
    product.stock = stock;
    product.updated_at = Utc::now();
    Ok(Some(product.clone()))
  }
}

#[async_trait]
impl OfferStore for InMemoryStore {
  async fn list_offers(&self, active_only: bool) -> StoreResult<Vec<Offer>> {
    let state = self.state.read();
    let mut offers: Vec<Offer> = state.offers.iter().filter(|o| !active_only || o.active).cloned().collect();
    offers.sort_by_key(|o| o.order_position);
    Ok(offers)
  }

  async fn get_offer(&self, id: Uuid) -> StoreResult<Option<Offer>> {
    Ok(self.state.read().offers.iter().find(|o| o.id == id).cloned())
  }

  async fn create_offer(&self, input: &OfferInput) -> StoreResult<Offer> {
    let mut state = self.state.write();
    let offer = Offer {
      id: Uuid::new_v4(),
      title: input.title.clone(),
      image_url: input.image_url.clone(),
      product_id: input.product_id,
      active: input.active,
      order_position: state.offers.iter().map(|o| o.order_position + 1).max().unwrap_or(0),
      created_at: Utc::now(),
    };
    state.offers.push(offer.clone());
    Ok(offer)
  }

  async fn update_offer(&self, id: Uuid, input: &OfferInput) -> StoreResult<Option<Offer>> {
    let mut state = self.state.write();
    let Some(offer) = state.offers.iter_mut().find(|o| o.id == id) else {
      return Ok(None);
    };
    offer.title = input.title.clone();
    offer.image_url = input.image_url.clone();
    offer.product_id = input.product_id;
    offer.active = input.active;
    Ok(Some(offer.clone()))
  }

  async fn delete_offer(&self, id: Uuid) -> StoreResult<bool> {
    let mut state = self.state.write();
    let before = state.offers.len();
    state.offers.retain(|o| o.id != id);
    Ok(state.offers.len() != before)
  }

  async fn set_offer_positions(&self, positions: &[(Uuid, i32)]) -> StoreResult<()> {
    let mut state = self.state.write();
    if let Some((missing, _)) = positions.iter().find(|(id, _)| !state.offers.iter().any(|o| o.id == *id)) {
      return Err(StoreError::NotFound(format!("Offer {} not found", missing)));
    }
    for (id, position) in positions {
      if let Some(offer) = state.offers.iter_mut().find(|o| o.id == *id) {
        offer.order_position = *position;
      }
    }
    Ok(())
  }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
  async fn get_settings(&self) -> StoreResult<StoreSettings> {
    self
      .state
      .read()
      .settings
      .clone()
      .ok_or_else(|| StoreError::NotFound("Store settings row is missing".to_string()))
  }

  async fn update_settings(&self, update: &SettingsUpdate) -> StoreResult<StoreSettings> {
    let mut state = self.state.write();
    let settings = state
      .settings
      .as_mut()
      .ok_or_else(|| StoreError::NotFound("Store settings row is missing".to_string()))?;
    settings.apply(update);
    Ok(settings.clone())
  }
}

#[async_trait]
impl OrderStore for InMemoryStore {
  async fn find_order_by_session(&self, session_id: &str) -> StoreResult<Option<Order>> {
    Ok(self.state.read().orders.iter().find(|o| o.stripe_session_id == session_id).cloned())
  }

  async fn fulfill_checkout(&self, request: &FulfillmentRequest) -> StoreResult<FulfillmentOutcome> {
    let mut guard = self.state.write();
    let state = &mut *guard;

    if let Some(existing) = state.orders.iter().find(|o| o.stripe_session_id == request.session_id) {
      return Ok(FulfillmentOutcome::AlreadyRecorded(existing.clone()));
    }
    let Some(product) = state.products.iter_mut().find(|p| p.id == request.product_id) else {
      return Ok(FulfillmentOutcome::ProductMissing);
    };
    if product.stock <= 0 {
      return Ok(FulfillmentOutcome::OutOfStock);
    }

    let now = Utc::now();
    product.stock -= 1;
    product.updated_at = now;
    let total_amount = request.amount_minor.map(from_minor_units).unwrap_or(product.price);

    let order = Order {
      id: Uuid::new_v4(),
      stripe_session_id: request.session_id.clone(),
      product_id: Some(request.product_id),
      quantity: 1,
      total_amount,
      status: ORDER_STATUS_COMPLETED.to_string(),
      created_at: now,
    };
    state.orders.push(order.clone());
    Ok(FulfillmentOutcome::Recorded(order))
  }
}

#[async_trait]
impl ReportingStore for InMemoryStore {
  async fn dashboard_stats(&self, query: &DashboardQuery) -> StoreResult<DashboardStats> {
    let state = self.state.read();

    let mut latest: Vec<&Order> = state.orders.iter().rev().collect();
    latest.sort_by_key(|o| Reverse(o.created_at));
    let latest_orders = latest
      .into_iter()
      .take(query.latest_limit.max(0) as usize)
      .map(|o| RecentOrder {
        id: o.id,
        stripe_session_id: o.stripe_session_id.clone(),
        product_id: o.product_id,
        product_name: o
          .product_id
          .and_then(|pid| state.products.iter().find(|p| p.id == pid))
          .map(|p| p.name.clone()),
        quantity: o.quantity,
        total_amount: o.total_amount,
        status: o.status.clone(),
        created_at: o.created_at,
      })
      .collect();

    Ok(DashboardStats {
      total_products: state.products.len() as i64,
      low_stock_products: state.products.iter().filter(|p| p.stock <= query.low_stock_threshold).count() as i64,
      recent_orders: state.orders.iter().filter(|o| o.created_at >= query.orders_since).count() as i64,
      active_offers: state.offers.iter().filter(|o| o.active).count() as i64,
      latest_orders,
    })
  }
}
