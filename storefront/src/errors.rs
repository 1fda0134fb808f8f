// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storefront_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// The text placed in the `error` field of the response body.
  fn client_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::Config(m) | AppError::Internal(m) => m.clone(),
      AppError::Sqlx(_) => "Database operation failed".to_string(),
      AppError::Store(store_err) => match store_err {
        StoreError::Validation(m)
        | StoreError::NotFound(m)
        | StoreError::Configuration(m)
        | StoreError::Provider(m)
        | StoreError::Payload(m) => m.clone(),
        StoreError::Backend { .. } => "Database operation failed".to_string(),
        StoreError::Pipeline(e) => e.to_string(),
      },
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
      AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, %status, "Responding with client error");
    }
    HttpResponse::build(status).json(json!({ "error": self.client_message() }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
