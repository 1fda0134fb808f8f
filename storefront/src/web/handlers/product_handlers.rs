// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use storefront_core::models::ProductInput;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  pub category: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SetStockRequest {
  pub stock: i32,
}

#[instrument(name = "handler::list_products", skip(app_state, query), fields(category = ?query.category))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.storefront_products(query.into_inner().category).await?;
  info!("Fetched {} storefront products.", products.len());
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.active_product(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(product))
}

// --- Admin ---

#[instrument(name = "handler::admin_list_products", skip_all)]
pub async fn admin_list_products_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(app_state.catalog.all_products().await?))
}

#[instrument(name = "handler::create_product", skip_all)]
pub async fn create_product_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
  req_body: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.create_product(req_body.into_inner()).await?;
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::update_product", skip(_admin, app_state, path, req_body), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_body: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .catalog
    .update_product(path.into_inner(), req_body.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::delete_product", skip(_admin, app_state, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.catalog.delete_product(path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::set_stock", skip(_admin, app_state, path, req_body), fields(product_id = %path.as_ref(), stock = req_body.stock))]
pub async fn set_stock_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_body: web::Json<SetStockRequest>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.set_stock(path.into_inner(), req_body.stock).await?;
  Ok(HttpResponse::Ok().json(product))
}
