// storefront/src/lib.rs

//! HTTP service for the storefront: checkout, the Stripe webhook, the public
//! catalog and the admin API, served by actix-web over PostgreSQL.

pub mod config;
pub mod db;
pub mod errors;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod web;
