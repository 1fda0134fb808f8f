// core/src/fulfillment/mod.rs

//! Applying completed payments to inventory and orders.
//!
//! Each webhook delivery runs through one pipeline:
//!
//! 1. `verify_signature`: no header is a validation error; a bad header too.
//! 2. `parse_event`: anything but `checkout.session.completed` stops the run.
//! 3. `extract_product`: sessions without a product reference stop the run.
//! 4. `skip_recorded_session`: a session that already has an order stops the run.
//! 5. `check_stock`: missing or sold-out products stop the run.
//! 6. `apply_fulfillment`: one atomic decrement-and-record in the store.
//! 7. `acknowledge`.
//!
//! A stopped run is still an acknowledged delivery; only errors are reported
//! back to the provider as failures.

pub mod event;
pub mod signature;

use crate::error::{StoreError, StoreResult};
use crate::models::Order;
use crate::pipeline::{ContextData, Pipeline, PipelineControl};
use crate::store::{FulfillmentOutcome, FulfillmentRequest, OrderStore, ProductStore, StorefrontStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub use event::{CheckoutSessionObject, WebhookEvent, CHECKOUT_SESSION_COMPLETED};
pub use signature::WebhookVerifier;

/// What a delivery amounted to. Every variant is acknowledged to the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
  IgnoredEventType { event_type: String },
  MissingProductReference,
  ProductUnavailable { product_id: Uuid },
  OutOfStock { product_id: Uuid },
  Duplicate { order: Order },
  Fulfilled { order: Order },
}

impl WebhookOutcome {
  pub fn is_fulfilled(&self) -> bool {
    matches!(self, WebhookOutcome::Fulfilled { .. })
  }
}

pub struct FulfillmentCtx {
  pub store: Arc<dyn StorefrontStore>,
  pub verifier: Option<Arc<WebhookVerifier>>,
  pub raw_payload: Vec<u8>,
  pub signature_header: Option<String>,
  pub received_at: DateTime<Utc>,
  pub session: Option<CheckoutSessionObject>,
  pub product_id: Option<Uuid>,
  pub outcome: Option<WebhookOutcome>,
}

pub struct FulfillmentService {
  store: Arc<dyn StorefrontStore>,
  verifier: Option<Arc<WebhookVerifier>>,
  pipeline: Pipeline<FulfillmentCtx, StoreError>,
}

impl FulfillmentService {
  /// `verifier` is `None` when no webhook secret is configured; signed
  /// deliveries then fail with a configuration error.
  pub fn new(store: Arc<dyn StorefrontStore>, verifier: Option<WebhookVerifier>) -> Self {
    Self {
      store,
      verifier: verifier.map(Arc::new),
      pipeline: build_fulfillment_pipeline(),
    }
  }

  pub async fn handle(&self, raw_payload: Vec<u8>, signature_header: Option<String>) -> StoreResult<WebhookOutcome> {
    self.handle_at(raw_payload, signature_header, Utc::now()).await
  }

  #[instrument(
    name = "FulfillmentService::handle",
    skip(self, raw_payload, signature_header),
    fields(payload_len = raw_payload.len(), signed = signature_header.is_some()),
    err(Display)
  )]
  pub async fn handle_at(
    &self,
    raw_payload: Vec<u8>,
    signature_header: Option<String>,
    received_at: DateTime<Utc>,
  ) -> StoreResult<WebhookOutcome> {
    let ctx = ContextData::new(FulfillmentCtx {
      store: self.store.clone(),
      verifier: self.verifier.clone(),
      raw_payload,
      signature_header,
      received_at,
      session: None,
      product_id: None,
      outcome: None,
    });

    let result = self.pipeline.run(ctx.clone()).await?;

    let outcome = ctx.read().outcome.clone();
    let outcome = outcome.ok_or_else(|| StoreError::Payload("Webhook produced no outcome".to_string()))?;
    info!(?result, ?outcome, "Webhook delivery acknowledged.");
    Ok(outcome)
  }
}

fn stop_with(ctx: &ContextData<FulfillmentCtx>, outcome: WebhookOutcome) -> StoreResult<PipelineControl> {
  ctx.write().outcome = Some(outcome);
  Ok(PipelineControl::Stop)
}

fn build_fulfillment_pipeline() -> Pipeline<FulfillmentCtx, StoreError> {
  let mut p = Pipeline::<FulfillmentCtx, StoreError>::new(&[
    ("verify_signature", false),
    ("parse_event", false),
    ("extract_product", false),
    ("skip_recorded_session", false),
    ("check_stock", false),
    ("apply_fulfillment", false),
    ("acknowledge", false),
  ]);

  p.on_step("verify_signature", |ctx: ContextData<FulfillmentCtx>| async move {
    let guard = ctx.read();
    let Some(header) = guard.signature_header.as_deref() else {
      warn!("Webhook delivery without signature header rejected.");
      return Err(StoreError::Validation("No signature provided".to_string()));
    };
    let verifier = guard
      .verifier
      .as_ref()
      .ok_or_else(|| StoreError::Configuration("Webhook signing secret is not configured".to_string()))?;
    verifier.verify(&guard.raw_payload, header, guard.received_at.timestamp())?;
    Ok(PipelineControl::Continue)
  });

  p.on_step("parse_event", |ctx: ContextData<FulfillmentCtx>| async move {
    let event: WebhookEvent = serde_json::from_slice(&ctx.read().raw_payload)?;
    info!(event_id = ?event.id, event_type = %event.event_type, "Webhook event parsed.");

    if event.event_type != CHECKOUT_SESSION_COMPLETED {
      return stop_with(
        &ctx,
        WebhookOutcome::IgnoredEventType {
          event_type: event.event_type,
        },
      );
    }

    let session: CheckoutSessionObject = serde_json::from_value(event.data.object)?;
    ctx.write().session = Some(session);
    Ok(PipelineControl::Continue)
  });

  p.on_step("extract_product", |ctx: ContextData<FulfillmentCtx>| async move {
    let product_id = ctx.read().session.as_ref().and_then(CheckoutSessionObject::product_id);
    match product_id {
      Some(product_id) => {
        ctx.write().product_id = Some(product_id);
        Ok(PipelineControl::Continue)
      }
      None => {
        warn!("Completed session carries no usable product reference.");
        stop_with(&ctx, WebhookOutcome::MissingProductReference)
      }
    }
  });

  p.on_step("skip_recorded_session", |ctx: ContextData<FulfillmentCtx>| async move {
    let (store, session_id) = {
      let guard = ctx.read();
      (guard.store.clone(), guard.session.as_ref().map(|s| s.id.clone()).unwrap_or_default())
    };
    match store.find_order_by_session(&session_id).await? {
      Some(order) => {
        info!(%session_id, order_id = %order.id, "Session already fulfilled; redelivery ignored.");
        stop_with(&ctx, WebhookOutcome::Duplicate { order })
      }
      None => Ok(PipelineControl::Continue),
    }
  });

  p.on_step("check_stock", |ctx: ContextData<FulfillmentCtx>| async move {
    let (store, product_id) = {
      let guard = ctx.read();
      (guard.store.clone(), guard.product_id.unwrap_or_default())
    };
    match store.get_product(product_id).await? {
      None => {
        warn!(%product_id, "Paid product no longer exists; nothing to fulfill.");
        stop_with(&ctx, WebhookOutcome::ProductUnavailable { product_id })
      }
      Some(product) if product.stock <= 0 => {
        warn!(%product_id, "Paid product is out of stock; nothing to fulfill.");
        stop_with(&ctx, WebhookOutcome::OutOfStock { product_id })
      }
      Some(product) => {
        info!(%product_id, stock = product.stock, "Stock available.");
        Ok(PipelineControl::Continue)
      }
    }
  });

  p.on_step("apply_fulfillment", |ctx: ContextData<FulfillmentCtx>| async move {
    let (store, request) = {
      let guard = ctx.read();
      let session = guard.session.as_ref();
      let request = FulfillmentRequest {
        session_id: session.map(|s| s.id.clone()).unwrap_or_default(),
        product_id: guard.product_id.unwrap_or_default(),
        amount_minor: session.and_then(|s| s.amount_total),
      };
      (guard.store.clone(), request)
    };

    let outcome = match store.fulfill_checkout(&request).await? {
      FulfillmentOutcome::Recorded(order) => {
        info!(order_id = %order.id, product_id = %request.product_id, "Stock decremented and order recorded.");
        WebhookOutcome::Fulfilled { order }
      }
      FulfillmentOutcome::AlreadyRecorded(order) => WebhookOutcome::Duplicate { order },
      FulfillmentOutcome::ProductMissing => WebhookOutcome::ProductUnavailable {
        product_id: request.product_id,
      },
      FulfillmentOutcome::OutOfStock => {
        warn!(product_id = %request.product_id, "Stock ran out before this payment could be applied.");
        WebhookOutcome::OutOfStock {
          product_id: request.product_id,
        }
      }
    };
    ctx.write().outcome = Some(outcome);
    Ok::<_, StoreError>(PipelineControl::Continue)
  });

  p.on_step("acknowledge", |ctx: ContextData<FulfillmentCtx>| async move {
    let fulfilled = ctx.read().outcome.as_ref().is_some_and(WebhookOutcome::is_fulfilled);
    info!(fulfilled, "Webhook processing finished.");
    Ok::<_, StoreError>(PipelineControl::Continue)
  });

  p
}
