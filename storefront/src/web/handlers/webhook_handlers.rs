// storefront/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// The body is taken as raw bytes: the signature covers it byte for byte.
#[instrument(
  name = "handler::stripe_webhook",
  skip(app_state, req, body),
  fields(payload_len = body.len())
)]
pub async fn stripe_webhook_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let signature_header = req
    .headers()
    .get(SIGNATURE_HEADER)
    .and_then(|h| h.to_str().ok())
    .map(String::from);

  let outcome = app_state.fulfillment.handle(body.to_vec(), signature_header).await?;
  info!(outcome = ?outcome, "Webhook acknowledged.");
  Ok(HttpResponse::Ok().json(json!({ "received": true })))
}

pub async fn webhook_preflight_handler() -> HttpResponse {
  HttpResponse::Ok().finish()
}
