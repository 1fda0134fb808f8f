// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

/// Lets the success page confirm a purchase once the webhook has landed.
#[instrument(name = "handler::get_order_by_session", skip(app_state, path), fields(session_id = %path.as_str()))]
pub async fn get_order_by_session_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.catalog.order_for_session(&path).await?;
  Ok(HttpResponse::Ok().json(order))
}
