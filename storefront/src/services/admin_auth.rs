// storefront/src/services/admin_auth.rs

//! Admin bearer tokens. Only an Argon2 hash of the token is configured; the
//! token itself is handed to the operator once by `hash_admin_token`.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use rand_core::RngCore;
use tracing::{debug, error, instrument};

/// Length in bytes of generated tokens, before hex encoding.
pub const GENERATED_TOKEN_BYTES: usize = 32;

pub fn generate_token() -> String {
  let mut bytes = [0u8; GENERATED_TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

#[instrument(name = "admin_auth::hash_token", skip(token), err(Display))]
pub fn hash_token(token: &str) -> Result<String, AppError> {
  if token.is_empty() {
    return Err(AppError::Validation("Admin token cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(token.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 token hashing failed.");
      AppError::Internal(format!("Token hashing failed: {}", argon_err))
    })
}

/// `Ok(false)` for a wrong token; `Err` only when the stored hash itself is unusable.
#[instrument(name = "admin_auth::verify_token", skip_all, err(Display))]
pub fn verify_token(stored_hash: &str, provided_token: &str) -> Result<bool, AppError> {
  if provided_token.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "ADMIN_TOKEN_HASH is not a valid PHC string.");
    AppError::Config(format!("Invalid admin token hash: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_token.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Admin token mismatch.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 verification failed.");
      Err(AppError::Internal(format!("Token verification failed: {}", other)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashed_token_verifies_and_others_do_not() {
    let hash = hash_token("s3cret-admin").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_token(&hash, "s3cret-admin").unwrap());
    assert!(!verify_token(&hash, "guess").unwrap());
    assert!(!verify_token(&hash, "").unwrap());
  }

  #[test]
  fn malformed_hash_is_a_configuration_error() {
    assert!(matches!(verify_token("not-a-phc-string", "x"), Err(AppError::Config(_))));
  }

  #[test]
  fn generated_tokens_are_hex_and_distinct() {
    let a = generate_token();
    let b = generate_token();
    assert_eq!(a.len(), GENERATED_TOKEN_BYTES * 2);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
    assert_eq!(hex::decode(&a).unwrap().len(), GENERATED_TOKEN_BYTES);
  }
}
