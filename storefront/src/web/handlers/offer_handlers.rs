// storefront/src/web/handlers/offer_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use storefront_core::models::OfferInput;
use storefront_core::MoveDirection;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Deserialize, Debug)]
pub struct MoveOfferRequest {
  pub direction: MoveDirection,
}

#[instrument(name = "handler::list_active_offers", skip_all)]
pub async fn list_active_offers_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(app_state.catalog.active_offers().await?))
}

#[instrument(name = "handler::admin_list_offers", skip_all)]
pub async fn admin_list_offers_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(app_state.catalog.all_offers().await?))
}

#[instrument(name = "handler::create_offer", skip_all)]
pub async fn create_offer_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
  req_body: web::Json<OfferInput>,
) -> Result<HttpResponse, AppError> {
  let offer = app_state.catalog.create_offer(req_body.into_inner()).await?;
  Ok(HttpResponse::Created().json(offer))
}

#[instrument(name = "handler::update_offer", skip(_admin, app_state, path, req_body), fields(offer_id = %path.as_ref()))]
pub async fn update_offer_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_body: web::Json<OfferInput>,
) -> Result<HttpResponse, AppError> {
  let offer = app_state
    .catalog
    .update_offer(path.into_inner(), req_body.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(offer))
}

#[instrument(name = "handler::delete_offer", skip(_admin, app_state, path), fields(offer_id = %path.as_ref()))]
pub async fn delete_offer_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.catalog.delete_offer(path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}

/// Responds with the whole carousel in its new order.
#[instrument(name = "handler::move_offer", skip(_admin, app_state, path, req_body), fields(offer_id = %path.as_ref(), direction = ?req_body.direction))]
pub async fn move_offer_handler(
  _admin: AdminUser,
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_body: web::Json<MoveOfferRequest>,
) -> Result<HttpResponse, AppError> {
  let offers = app_state
    .catalog
    .move_offer(path.into_inner(), req_body.direction)
    .await?;
  Ok(HttpResponse::Ok().json(offers))
}
