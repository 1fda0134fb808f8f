// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use storefront_core::checkout::stripe::DEFAULT_API_BASE;
use storefront_core::checkout::CheckoutSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl LogFormat {
  /// Reads `LOG_FORMAT`; anything other than `json` means pretty output.
  pub fn from_env() -> Self {
    match env::var("LOG_FORMAT") {
      Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
      _ => LogFormat::Pretty,
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  /// Public storefront URL used for payment redirects.
  pub public_base_url: String,

  pub stripe_secret_key: Option<String>,
  pub stripe_webhook_secret: Option<String>,
  pub stripe_api_base: String,
  pub checkout_currency: String,

  /// Argon2 PHC string of the admin bearer token. Without it every admin request is refused.
  pub admin_token_hash: Option<String>,

  pub run_migrations: bool,
}

// Secrets stay out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let redacted = |v: &Option<String>| if v.is_some() { "[REDACTED]" } else { "<unset>" };
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &"[REDACTED]")
      .field("database_max_connections", &self.database_max_connections)
      .field("public_base_url", &self.public_base_url)
      .field("stripe_secret_key", &redacted(&self.stripe_secret_key))
      .field("stripe_webhook_secret", &redacted(&self.stripe_webhook_secret))
      .field("stripe_api_base", &self.stripe_api_base)
      .field("checkout_currency", &self.checkout_currency)
      .field("admin_token_hash", &redacted(&self.admin_token_hash))
      .field("run_migrations", &self.run_migrations)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    // Optional secrets: unset and blank are the same thing.
    let get_optional = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "5".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let public_base_url = get_env("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let stripe_secret_key = get_optional("STRIPE_SECRET_KEY");
    let stripe_webhook_secret = get_optional("STRIPE_WEBHOOK_SECRET");
    let stripe_api_base = get_env("STRIPE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
    let checkout_currency = get_env("CHECKOUT_CURRENCY")
      .unwrap_or_else(|_| "brl".to_string())
      .to_lowercase();

    let admin_token_hash = get_optional("ADMIN_TOKEN_HASH");

    let run_migrations = get_env("RUN_MIGRATIONS")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    if stripe_secret_key.is_none() {
      tracing::warn!("STRIPE_SECRET_KEY is not set; checkout requests will fail.");
    }
    if stripe_webhook_secret.is_none() {
      tracing::warn!("STRIPE_WEBHOOK_SECRET is not set; webhook deliveries will fail.");
    }
    if admin_token_hash.is_none() {
      tracing::warn!("ADMIN_TOKEN_HASH is not set; the admin API is locked.");
    }

    let config = Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      public_base_url,
      stripe_secret_key,
      stripe_webhook_secret,
      stripe_api_base,
      checkout_currency,
      admin_token_hash,
      run_migrations,
    };
    tracing::info!(config = ?config, "Application configuration loaded successfully.");
    Ok(config)
  }

  pub fn checkout_settings(&self) -> CheckoutSettings {
    CheckoutSettings {
      currency: self.checkout_currency.clone(),
      public_base_url: self.public_base_url.clone(),
    }
  }
}
