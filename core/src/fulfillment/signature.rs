// core/src/fulfillment/signature.rs

//! Verification of the provider's `Stripe-Signature` header.
//!
//! The header looks like `t=1700000000,v1=<hex>,v1=<hex>`. Each `v1` is
//! `HMAC-SHA256(secret, "<t>.<raw body>")`; one match is enough.

use crate::error::{StoreError, StoreResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age (and clock skew) of a signed timestamp, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Clone)]
pub struct WebhookVerifier {
  secret: String,
  tolerance_secs: i64,
}

impl std::fmt::Debug for WebhookVerifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WebhookVerifier")
      .field("secret", &"[REDACTED]")
      .field("tolerance_secs", &self.tolerance_secs)
      .finish()
  }
}

struct ParsedHeader {
  timestamp: i64,
  signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Option<ParsedHeader> {
  let mut timestamp = None;
  let mut signatures = Vec::new();
  for part in header.split(',') {
    let Some((key, value)) = part.trim().split_once('=') else {
      continue;
    };
    match key {
      "t" => timestamp = value.parse::<i64>().ok(),
      // Undecodable candidates are ignored; other schemes (v0) are not accepted.
      "v1" => signatures.extend(hex::decode(value).ok()),
      _ => {}
    }
  }
  Some(ParsedHeader {
    timestamp: timestamp?,
    signatures,
  })
}

impl WebhookVerifier {
  pub fn new(secret: impl Into<String>) -> Self {
    Self {
      secret: secret.into(),
      tolerance_secs: DEFAULT_TOLERANCE_SECS,
    }
  }

  pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
    self.tolerance_secs = tolerance_secs;
    self
  }

  fn mac_for(&self, payload: &[u8], timestamp: i64) -> StoreResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
      .map_err(|e| StoreError::Configuration(format!("Invalid webhook secret: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
  }

  /// Checks `header` against `payload` as received at unix time `now`.
  pub fn verify(&self, payload: &[u8], header: &str, now: i64) -> StoreResult<()> {
    let parsed = parse_header(header).ok_or_else(|| {
      warn!("Signature header has no timestamp.");
      StoreError::Validation("Malformed signature header".to_string())
    })?;

    // `t` is caller-controlled; abs_diff cannot overflow on extreme values.
    if now.abs_diff(parsed.timestamp) > self.tolerance_secs.unsigned_abs() {
      warn!(timestamp = parsed.timestamp, now, "Signature timestamp outside tolerance.");
      return Err(StoreError::Validation("Signature timestamp outside tolerance".to_string()));
    }
    if parsed.signatures.is_empty() {
      return Err(StoreError::Validation("No v1 signature in header".to_string()));
    }

    let mac = self.mac_for(payload, parsed.timestamp)?;
    if parsed.signatures.iter().any(|candidate| mac.clone().verify_slice(candidate).is_ok()) {
      debug!("Webhook signature verified.");
      Ok(())
    } else {
      warn!("Webhook signature mismatch.");
      Err(StoreError::Validation("Invalid signature".to_string()))
    }
  }

  /// Builds a header for `payload` signed at `timestamp`, as the provider would send it.
  pub fn sign(&self, payload: &[u8], timestamp: i64) -> StoreResult<String> {
    let mac = self.mac_for(payload, timestamp)?;
    Ok(format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes())))
  }
}
