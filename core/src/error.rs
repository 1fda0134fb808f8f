// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Errors raised by the step pipeline itself, as opposed to its handlers.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
  /// A credential or secret the operation needs is not configured.
  #[error("Configuration error: {0}")]
  Configuration(String),

  /// The payment provider rejected the request. The message is the provider's own.
  #[error("{0}")]
  Provider(String),

  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Not found: {0}")]
  NotFound(String),

  /// The webhook body could not be understood.
  #[error("Invalid payload: {0}")]
  Payload(String),

  #[error("Storage backend error: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },

  #[error("Pipeline error: {0}")]
  Pipeline(#[from] PipelineError),
}

impl StoreError {
  pub fn backend(err: impl Into<AnyhowError>) -> Self {
    StoreError::Backend { source: err.into() }
  }
}

impl From<serde_json::Error> for StoreError {
  fn from(err: serde_json::Error) -> Self {
    StoreError::Payload(err.to_string())
  }
}

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;
