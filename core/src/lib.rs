// src/lib.rs

//! Storefront core: the rules behind a small single-product-checkout shop.
//!
//! - `checkout` opens a hosted payment session for one unit of a product.
//! - `fulfillment` verifies and applies the provider's "session completed"
//!   webhook, decrementing stock and recording exactly one order per session.
//! - `catalog` covers products, the offers carousel, store settings and the
//!   admin dashboard.
//!
//! Checkout and fulfillment each run as a named-step `Pipeline` over a shared
//! `ContextData`. Storage sits behind the `store` traits; `InMemoryStore` ships
//! here, and the application provides a PostgreSQL one.

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod fulfillment;
pub mod models;
pub mod money;
pub mod pipeline;
pub mod store;

pub use crate::catalog::{Catalog, MoveDirection, StorefrontPage};
pub use crate::checkout::{
  CheckoutRequest, CheckoutService, CheckoutSettings, HostedSession, PaymentProvider, SessionSpec, StripeClient,
};
pub use crate::error::{PipelineError, StoreError, StoreResult};
pub use crate::fulfillment::{FulfillmentService, WebhookOutcome, WebhookVerifier};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult};
pub use crate::store::{InMemoryStore, StorefrontStore};
