// storefront/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[instrument(name = "handler::dashboard", skip_all)]
pub async fn dashboard_handler(_admin: AdminUser, app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let stats = app_state.catalog.dashboard().await?;
  info!(
    total_products = stats.total_products,
    low_stock = stats.low_stock_products,
    recent_orders = stats.recent_orders,
    "Dashboard computed."
  );
  Ok(HttpResponse::Ok().json(stats))
}
