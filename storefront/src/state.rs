// storefront/src/state.rs
use crate::config::AppConfig;
use std::sync::Arc;
use storefront_core::checkout::{PaymentProvider, StripeClient};
use storefront_core::{Catalog, CheckoutService, FulfillmentService, StorefrontStore, WebhookVerifier};

#[derive(Clone)]
pub struct AppState {
  pub checkout: Arc<CheckoutService>,
  pub fulfillment: Arc<FulfillmentService>,
  pub catalog: Catalog,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the services against `store`, using Stripe when a secret key is configured.
  pub fn new(config: Arc<AppConfig>, store: Arc<dyn StorefrontStore>) -> Self {
    let provider = config.stripe_secret_key.as_ref().map(|key| {
      Arc::new(StripeClient::new(key.clone()).with_api_base(config.stripe_api_base.clone())) as Arc<dyn PaymentProvider>
    });
    Self::with_provider(config, store, provider)
  }

  pub fn with_provider(
    config: Arc<AppConfig>,
    store: Arc<dyn StorefrontStore>,
    provider: Option<Arc<dyn PaymentProvider>>,
  ) -> Self {
    let verifier = config.stripe_webhook_secret.as_ref().map(WebhookVerifier::new);
    Self {
      checkout: Arc::new(CheckoutService::new(store.clone(), provider, config.checkout_settings())),
      fulfillment: Arc::new(FulfillmentService::new(store.clone(), verifier)),
      catalog: Catalog::new(store),
      config,
    }
  }
}
