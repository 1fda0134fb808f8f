// storefront/src/web/handlers/settings_handlers.rs

use actix_web::{web, HttpResponse};
use storefront_core::models::SettingsUpdate;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[instrument(name = "handler::get_settings", skip_all)]
pub async fn get_settings_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(app_state.catalog.settings().await?))
}

#[instrument(name = "handler::storefront_page", skip_all)]
pub async fn storefront_page_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(app_state.catalog.storefront_page().await?))
}

#[instrument(name = "handler::admin_get_settings", skip_all)]
pub async fn admin_get_settings_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(app_state.catalog.settings().await?))
}

#[instrument(name = "handler::update_settings", skip_all)]
pub async fn update_settings_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
  req_body: web::Json<SettingsUpdate>,
) -> Result<HttpResponse, AppError> {
  let settings = app_state.catalog.update_settings(req_body.into_inner()).await?;
  Ok(HttpResponse::Ok().json(settings))
}
