// storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Serialize;
use storefront_core::CheckoutRequest;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
  pub url: String,
  pub session_id: String,
}

#[instrument(
  name = "handler::start_checkout",
  skip(app_state, req_body),
  fields(product_id = %req_body.product_id)
)]
pub async fn start_checkout_handler(
  app_state: web::Data<AppState>,
  req_body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
  let session = app_state.checkout.start(req_body.into_inner()).await?;
  info!(session_id = %session.id, "Checkout session ready; redirecting shopper.");
  Ok(HttpResponse::Ok().json(CheckoutResponse {
    url: session.url,
    session_id: session.id,
  }))
}
