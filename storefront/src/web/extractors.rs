// storefront/src/web/extractors.rs

use crate::errors::AppError;
use crate::services::admin_auth;
use crate::state::AppState;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

/// Proof that the request carried the admin bearer token.
#[derive(Debug)]
pub struct AdminUser;

fn bearer_token(req: &HttpRequest) -> Option<&str> {
  let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

fn authorize(req: &HttpRequest) -> Result<AdminUser, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;

  let Some(stored_hash) = state.config.admin_token_hash.as_deref() else {
    warn!("Admin request refused: no admin token hash configured.");
    return Err(AppError::Auth("Admin access is not configured".to_string()));
  };
  let Some(token) = bearer_token(req) else {
    return Err(AppError::Auth("Missing bearer token".to_string()));
  };

  if admin_auth::verify_token(stored_hash, token)? {
    Ok(AdminUser)
  } else {
    warn!(path = %req.path(), "Admin request with invalid token.");
    Err(AppError::Auth("Invalid admin token".to_string()))
  }
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(authorize(req))
  }
}
