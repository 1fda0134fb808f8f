// storefront/src/services/mod.rs
pub mod admin_auth;
