// storefront/src/db/pg_store.rs

//! PostgreSQL implementation of the storefront store traits, using runtime
//! queries mapped straight into the core models.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use storefront_core::models::{
  Offer, OfferInput, Order, Product, ProductFilter, ProductInput, RecentOrder, SettingsUpdate, StoreSettings,
  ORDER_STATUS_COMPLETED,
};
use storefront_core::money::from_minor_units;
use storefront_core::store::{
  DashboardQuery, DashboardStats, FulfillmentOutcome, FulfillmentRequest, OfferStore, OrderStore, ProductStore,
  ReportingStore, SettingsStore,
};
use storefront_core::{StoreError, StoreResult};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
  "id, name, category, description, price, stock, image_url, active, created_at, updated_at";
const OFFER_COLUMNS: &str = "id, title, image_url, product_id, active, order_position, created_at";
const SETTINGS_COLUMNS: &str = "id, primary_color, secondary_color, neutral_color, store_name, store_description, \
                                show_offers, show_featured, updated_at";
const ORDER_COLUMNS: &str = "id, stripe_session_id, product_id, quantity, total_amount, status, created_at";

fn db_error(err: sqlx::Error) -> StoreError {
  error!(error = %err, "Database query failed.");
  StoreError::backend(err)
}

#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn begin(&self) -> StoreResult<Transaction<'static, Postgres>> {
    self.pool.begin().await.map_err(db_error)
  }
}

#[async_trait]
impl ProductStore for PgStore {
  async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
    sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products \
       WHERE ($1 = FALSE OR active) AND ($2::text IS NULL OR category = $2) \
       ORDER BY created_at DESC",
      PRODUCT_COLUMNS
    ))
    .bind(filter.active_only)
    .bind(filter.category.as_deref())
    .fetch_all(&self.pool)
    .await
    .map_err(db_error)
  }

  async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_error)
  }

  async fn create_product(&self, input: &ProductInput) -> StoreResult<Product> {
    sqlx::query_as::<_, Product>(&format!(
      "INSERT INTO products (id, name, category, description, price, stock, image_url, active) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&input.name)
    .bind(&input.category)
    .bind(&input.description)
    .bind(input.price)
    .bind(input.stock)
    .bind(&input.image_url)
    .bind(input.active)
    .fetch_one(&self.pool)
    .await
    .map_err(db_error)
  }

  async fn update_product(&self, id: Uuid, input: &ProductInput) -> StoreResult<Option<Product>> {
    sqlx::query_as::<_, Product>(&format!(
      "UPDATE products SET name = $2, category = $3, description = $4, price = $5, stock = $6, \
       image_url = $7, active = $8, updated_at = NOW() WHERE id = $1 RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(id)
    .bind(&input.name)
    .bind(&input.category)
    .bind(&input.description)
    .bind(input.price)
    .bind(input.stock)
    .bind(&input.image_url)
    .bind(input.active)
    .fetch_optional(&self.pool)
    .await
    .map_err(db_error)
  }

  async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
    // Offers and orders keep their rows; the foreign keys null the reference.
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(db_error)?;
    Ok(result.rows_affected() > 0)
  }

  async fn set_stock(&self, id: Uuid, stock: i32) -> StoreResult<Option<Product>> {
    sqlx::query_as::<_, Product>(&format!(
      "UPDATE products SET stock = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(id)
    .bind(stock)
    .fetch_optional(&self.pool)
    .await
    .map_err(db_error)
  }
}

#[async_trait]
impl OfferStore for PgStore {
  async fn list_offers(&self, active_only: bool) -> StoreResult<Vec<Offer>> {
    sqlx::query_as::<_, Offer>(&format!(
      "SELECT {} FROM offers WHERE ($1 = FALSE OR active) ORDER BY order_position ASC, created_at ASC",
      OFFER_COLUMNS
    ))
    .bind(active_only)
    .fetch_all(&self.pool)
    .await
    .map_err(db_error)
  }

  async fn get_offer(&self, id: Uuid) -> StoreResult<Option<Offer>> {
    sqlx::query_as::<_, Offer>(&format!("SELECT {} FROM offers WHERE id = $1", OFFER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_error)
  }

  async fn create_offer(&self, input: &OfferInput) -> StoreResult<Offer> {
    sqlx::query_as::<_, Offer>(&format!(
      "INSERT INTO offers (id, title, image_url, product_id, active, order_position) \
       VALUES ($1, $2, $3, $4, $5, (SELECT COALESCE(MAX(order_position) + 1, 0) FROM offers)) RETURNING {}",
      OFFER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&input.title)
    .bind(&input.image_url)
    .bind(input.product_id)
    .bind(input.active)
    .fetch_one(&self.pool)
    .await
    .map_err(db_error)
  }

  async fn update_offer(&self, id: Uuid, input: &OfferInput) -> StoreResult<Option<Offer>> {
    sqlx::query_as::<_, Offer>(&format!(
      "UPDATE offers SET title = $2, image_url = $3, product_id = $4, active = $5 WHERE id = $1 RETURNING {}",
      OFFER_COLUMNS
    ))
    .bind(id)
    .bind(&input.title)
    .bind(&input.image_url)
    .bind(input.product_id)
    .bind(input.active)
    .fetch_optional(&self.pool)
    .await
    .map_err(db_error)
  }

  async fn delete_offer(&self, id: Uuid) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM offers WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(db_error)?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "PgStore::set_offer_positions", skip_all, fields(count = positions.len()), err(Display))]
  async fn set_offer_positions(&self, positions: &[(Uuid, i32)]) -> StoreResult<()> {
    let mut tx = self.begin().await?;
    for (id, position) in positions {
      let result = sqlx::query("UPDATE offers SET order_position = $2 WHERE id = $1")
        .bind(id)
        .bind(position)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;
      if result.rows_affected() == 0 {
        tx.rollback().await.map_err(db_error)?;
        return Err(StoreError::NotFound(format!("Offer {} not found", id)));
      }
    }
    tx.commit().await.map_err(db_error)
  }
}

#[async_trait]
impl SettingsStore for PgStore {
  async fn get_settings(&self) -> StoreResult<StoreSettings> {
    sqlx::query_as::<_, StoreSettings>(&format!("SELECT {} FROM store_settings LIMIT 1", SETTINGS_COLUMNS))
      .fetch_optional(&self.pool)
      .await
      .map_err(db_error)?
      .ok_or_else(|| StoreError::NotFound("Store settings row is missing".to_string()))
  }

  async fn update_settings(&self, update: &SettingsUpdate) -> StoreResult<StoreSettings> {
    sqlx::query_as::<_, StoreSettings>(&format!(
      "UPDATE store_settings SET \
       primary_color = COALESCE($1, primary_color), \
       secondary_color = COALESCE($2, secondary_color), \
       neutral_color = COALESCE($3, neutral_color), \
       store_name = COALESCE($4, store_name), \
       store_description = COALESCE($5, store_description), \
       show_offers = COALESCE($6, show_offers), \
       show_featured = COALESCE($7, show_featured), \
       updated_at = NOW() \
       WHERE singleton RETURNING {}",
      SETTINGS_COLUMNS
    ))
    .bind(update.primary_color.as_deref())
    .bind(update.secondary_color.as_deref())
    .bind(update.neutral_color.as_deref())
    .bind(update.store_name.as_deref())
    .bind(update.store_description.as_deref())
    .bind(update.show_offers)
    .bind(update.show_featured)
    .fetch_optional(&self.pool)
    .await
    .map_err(db_error)?
    .ok_or_else(|| StoreError::NotFound("Store settings row is missing".to_string()))
  }
}

#[async_trait]
impl OrderStore for PgStore {
  async fn find_order_by_session(&self, session_id: &str) -> StoreResult<Option<Order>> {
    sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE stripe_session_id = $1", ORDER_COLUMNS))
      .bind(session_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_error)
  }

  #[instrument(
    name = "PgStore::fulfill_checkout",
    skip_all,
    fields(session_id = %request.session_id, product_id = %request.product_id),
    err(Display)
  )]
  async fn fulfill_checkout(&self, request: &FulfillmentRequest) -> StoreResult<FulfillmentOutcome> {
    let mut tx = self.begin().await?;

    // Conditional decrement: the row lock it takes serializes racing deliveries.
    let price: Option<Decimal> = sqlx::query_scalar(
      "UPDATE products SET stock = stock - 1, updated_at = NOW() WHERE id = $1 AND stock > 0 RETURNING price",
    )
    .bind(request.product_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(db_error)?;

    let Some(price) = price else {
      let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1")
        .bind(request.product_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;
      tx.rollback().await.map_err(db_error)?;
      return Ok(match exists {
        Some(_) => FulfillmentOutcome::OutOfStock,
        None => FulfillmentOutcome::ProductMissing,
      });
    };

    let total_amount = request.amount_minor.map(from_minor_units).unwrap_or(price);
    let inserted = sqlx::query_as::<_, Order>(&format!(
      "INSERT INTO orders (id, stripe_session_id, product_id, quantity, total_amount, status) \
       VALUES ($1, $2, $3, 1, $4, $5) \
       ON CONFLICT (stripe_session_id) DO NOTHING RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&request.session_id)
    .bind(request.product_id)
    .bind(total_amount)
    .bind(ORDER_STATUS_COMPLETED)
    .fetch_optional(&mut *tx)
    .await
    .map_err(db_error)?;

    match inserted {
      Some(order) => {
        tx.commit().await.map_err(db_error)?;
        info!(order_id = %order.id, "Order recorded and stock decremented.");
        Ok(FulfillmentOutcome::Recorded(order))
      }
      None => {
        // Another delivery of this session won; undo our decrement.
        tx.rollback().await.map_err(db_error)?;
        warn!("Session already has an order; decrement rolled back.");
        let existing = self
          .find_order_by_session(&request.session_id)
          .await?
          .ok_or_else(|| StoreError::backend(anyhow::anyhow!("Conflicting order for session vanished")))?;
        Ok(FulfillmentOutcome::AlreadyRecorded(existing))
      }
    }
  }
}

#[async_trait]
impl ReportingStore for PgStore {
  async fn dashboard_stats(&self, query: &DashboardQuery) -> StoreResult<DashboardStats> {
    let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
      .fetch_one(&self.pool)
      .await
      .map_err(db_error)?;
    let low_stock_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock <= $1")
      .bind(query.low_stock_threshold)
      .fetch_one(&self.pool)
      .await
      .map_err(db_error)?;
    let recent_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE created_at >= $1")
      .bind(query.orders_since)
      .fetch_one(&self.pool)
      .await
      .map_err(db_error)?;
    let active_offers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM offers WHERE active")
      .fetch_one(&self.pool)
      .await
      .map_err(db_error)?;
    let latest_orders = sqlx::query_as::<_, RecentOrder>(
      "SELECT o.id, o.stripe_session_id, o.product_id, p.name AS product_name, o.quantity, o.total_amount, \
       o.status, o.created_at \
       FROM orders o LEFT JOIN products p ON p.id = o.product_id \
       ORDER BY o.created_at DESC LIMIT $1",
    )
    .bind(query.latest_limit)
    .fetch_all(&self.pool)
    .await
    .map_err(db_error)?;

    Ok(DashboardStats {
      total_products,
      low_stock_products,
      recent_orders,
      active_offers,
      latest_orders,
    })
  }
}
