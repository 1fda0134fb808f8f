// core/src/checkout/mod.rs

//! Opening hosted payment sessions for a single product.

pub mod stripe;

use crate::error::{StoreError, StoreResult};
use crate::money::to_minor_units;
use crate::pipeline::{ContextData, Pipeline, PipelineControl};
use crate::store::{ProductStore, StorefrontStore};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub use stripe::StripeClient;

/// Metadata key carrying the product id through the provider to the webhook.
pub const PRODUCT_ID_METADATA_KEY: &str = "productId";

/// Placeholder the provider substitutes with the real session id in the success URL.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
  pub product_id: Uuid,
  pub product_name: String,
  pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
  pub currency: String,
  /// Public URL of the storefront; redirect targets are built from it.
  pub public_base_url: String,
}

impl CheckoutSettings {
  pub fn success_url(&self) -> String {
    format!("{}/success?session_id={}", self.base(), SESSION_ID_PLACEHOLDER)
  }

  pub fn cancel_url(&self) -> String {
    self.base().to_string()
  }

  fn base(&self) -> &str {
    self.public_base_url.trim_end_matches('/')
  }
}

/// What the provider is asked to create: one line item, quantity one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSpec {
  pub product_name: String,
  /// Price in the smallest currency unit.
  pub unit_amount: i64,
  pub currency: String,
  pub quantity: u32,
  pub success_url: String,
  pub cancel_url: String,
  pub metadata: BTreeMap<String, String>,
}

impl SessionSpec {
  pub fn for_request(request: &CheckoutRequest, settings: &CheckoutSettings) -> StoreResult<Self> {
    let mut metadata = BTreeMap::new();
    metadata.insert(PRODUCT_ID_METADATA_KEY.to_string(), request.product_id.to_string());
    Ok(Self {
      product_name: request.product_name.clone(),
      unit_amount: to_minor_units(request.price)?,
      currency: settings.currency.clone(),
      quantity: 1,
      success_url: settings.success_url(),
      cancel_url: settings.cancel_url(),
      metadata,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedSession {
  pub id: String,
  pub url: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
  async fn create_session(&self, spec: &SessionSpec) -> StoreResult<HostedSession>;
}

pub struct CheckoutCtx {
  pub store: Arc<dyn StorefrontStore>,
  pub provider: Option<Arc<dyn PaymentProvider>>,
  pub settings: CheckoutSettings,
  pub request: CheckoutRequest,
  pub spec: Option<SessionSpec>,
  pub session: Option<HostedSession>,
}

pub struct CheckoutService {
  store: Arc<dyn StorefrontStore>,
  provider: Option<Arc<dyn PaymentProvider>>,
  settings: CheckoutSettings,
  pipeline: Pipeline<CheckoutCtx, StoreError>,
}

impl CheckoutService {
  /// `provider` is `None` when no payment credential is configured; every
  /// checkout then fails with a configuration error.
  pub fn new(
    store: Arc<dyn StorefrontStore>,
    provider: Option<Arc<dyn PaymentProvider>>,
    settings: CheckoutSettings,
  ) -> Self {
    Self {
      store,
      provider,
      settings,
      pipeline: build_checkout_pipeline(),
    }
  }

  #[instrument(
    name = "CheckoutService::start",
    skip(self, request),
    fields(product_id = %request.product_id, price = %request.price),
    err(Display)
  )]
  pub async fn start(&self, request: CheckoutRequest) -> StoreResult<HostedSession> {
    let ctx = ContextData::new(CheckoutCtx {
      store: self.store.clone(),
      provider: self.provider.clone(),
      settings: self.settings.clone(),
      request,
      spec: None,
      session: None,
    });

    self.pipeline.run(ctx.clone()).await?;

    let session = ctx.read().session.clone();
    session.ok_or_else(|| StoreError::Provider("Payment provider returned no session".to_string()))
  }
}

fn build_checkout_pipeline() -> Pipeline<CheckoutCtx, StoreError> {
  let mut p = Pipeline::<CheckoutCtx, StoreError>::new(&[
    ("ensure_provider_configured", false),
    ("validate_request", false),
    ("check_product_available", false),
    ("build_session_spec", false),
    ("open_hosted_session", false),
  ]);

  p.on_step("ensure_provider_configured", |ctx: ContextData<CheckoutCtx>| async move {
    if ctx.read().provider.is_none() {
      warn!("Checkout attempted without a payment provider credential.");
      return Err(StoreError::Configuration(
        "Payment provider credential is not configured".to_string(),
      ));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_step("validate_request", |ctx: ContextData<CheckoutCtx>| async move {
    let guard = ctx.read();
    if guard.request.price <= Decimal::ZERO {
      return Err(StoreError::Validation("Price must be greater than zero".to_string()));
    }
    if guard.request.product_name.trim().is_empty() {
      return Err(StoreError::Validation("Product name must not be empty".to_string()));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_step("check_product_available", |ctx: ContextData<CheckoutCtx>| async move {
    let (store, product_id, price) = {
      let guard = ctx.read();
      (guard.store.clone(), guard.request.product_id, guard.request.price)
    };

    let product = store
      .get_product(product_id)
      .await?
      .filter(|p| p.active)
      .ok_or_else(|| StoreError::NotFound(format!("Product {} not found", product_id)))?;

    if product.stock <= 0 {
      return Err(StoreError::Validation(format!("Product '{}' is out of stock", product.name)));
    }
    if product.price != price {
      warn!(catalog_price = %product.price, requested_price = %price, "Checkout price does not match catalog.");
      return Err(StoreError::Validation(format!("Price for '{}' has changed", product.name)));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_step("build_session_spec", |ctx: ContextData<CheckoutCtx>| async move {
    let mut guard = ctx.write();
    let spec = SessionSpec::for_request(&guard.request, &guard.settings)?;
    info!(unit_amount = spec.unit_amount, currency = %spec.currency, "Built checkout session spec.");
    guard.spec = Some(spec);
    Ok::<_, StoreError>(PipelineControl::Continue)
  });

  p.on_step("open_hosted_session", |ctx: ContextData<CheckoutCtx>| async move {
    let (provider, spec) = {
      let guard = ctx.read();
      (guard.provider.clone(), guard.spec.clone())
    };
    let provider = provider.ok_or_else(|| StoreError::Configuration("Payment provider credential is not configured".to_string()))?;
    let spec = spec.ok_or_else(|| StoreError::Validation("Session spec was not built".to_string()))?;

    let session = provider.create_session(&spec).await?;
    info!(session_id = %session.id, "Hosted payment session created.");
    ctx.write().session = Some(session);
    Ok::<_, StoreError>(PipelineControl::Continue)
  });

  p
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  fn settings() -> CheckoutSettings {
    CheckoutSettings {
      currency: "brl".to_string(),
      public_base_url: "https://shop.example.com/".to_string(),
    }
  }

  #[test]
  fn redirect_targets_use_public_base_without_trailing_slash() {
    let s = settings();
    assert_eq!(s.success_url(), "https://shop.example.com/success?session_id={CHECKOUT_SESSION_ID}");
    assert_eq!(s.cancel_url(), "https://shop.example.com");
  }

  #[test]
  fn session_spec_carries_product_metadata_and_cents() {
    let product_id = Uuid::new_v4();
    let request = CheckoutRequest {
      product_id,
      product_name: "Mug".to_string(),
      price: Decimal::from_str("12.345").unwrap(),
    };
    let spec = SessionSpec::for_request(&request, &settings()).unwrap();
    assert_eq!(spec.unit_amount, 1235);
    assert_eq!(spec.quantity, 1);
    assert_eq!(spec.currency, "brl");
    assert_eq!(spec.metadata.get(PRODUCT_ID_METADATA_KEY), Some(&product_id.to_string()));
  }

  #[test]
  fn checkout_request_reads_camel_case_json() {
    let id = Uuid::new_v4();
    let body = format!(r#"{{"productId":"{}","productName":"Lamp","price":49.9}}"#, id);
    let request: CheckoutRequest = serde_json::from_str(&body).unwrap();
    assert_eq!(request.product_id, id);
    assert_eq!(request.price, Decimal::from_str("49.9").unwrap());
  }
}
