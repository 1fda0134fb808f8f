// storefront/src/bin/hash_admin_token.rs

//! Prints an `ADMIN_TOKEN_HASH` value.
//!
//! `hash_admin_token <token>` hashes the given token; with no argument a fresh
//! random token is generated and printed alongside its hash.

use storefront_app::services::admin_auth::{generate_token, hash_token};

fn main() -> std::process::ExitCode {
  let (token, generated) = match std::env::args().nth(1) {
    Some(token) => (token, false),
    None => (generate_token(), true),
  };

  match hash_token(&token) {
    Ok(hash) => {
      if generated {
        println!("ADMIN_TOKEN={}", token);
      }
      // Single quotes keep dotenv from expanding the `$` separators.
      println!("ADMIN_TOKEN_HASH='{}'", hash);
      std::process::ExitCode::SUCCESS
    }
    Err(e) => {
      eprintln!("error: {}", e);
      std::process::ExitCode::FAILURE
    }
  }
}
