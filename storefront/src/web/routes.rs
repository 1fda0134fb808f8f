// storefront/src/web/routes.rs

use crate::errors::AppError;
use crate::web::handlers::{
  admin_handlers, checkout_handlers, offer_handlers, order_handlers, product_handlers, settings_handlers,
  webhook_handlers,
};
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, HttpResponse};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed JSON bodies, paths and query strings answer with the usual `{"error": ...}` body.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::PathConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()));
}

fn webhook_cors() -> DefaultHeaders {
  DefaultHeaders::new()
    .add(("Access-Control-Allow-Origin", "*"))
    .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
    .add((
      "Access-Control-Allow-Headers",
      "authorization, x-client-info, apikey, content-type, stripe-signature",
    ))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  extractor_configs(cfg);
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .route("/checkout", web::post().to(checkout_handlers::start_checkout_handler))
      .service(
        web::resource("/webhooks/stripe")
          .wrap(webhook_cors())
          .route(web::post().to(webhook_handlers::stripe_webhook_handler))
          .route(web::method(Method::OPTIONS).to(webhook_handlers::webhook_preflight_handler)),
      )
      .route("/storefront", web::get().to(settings_handlers::storefront_page_handler))
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      )
      .route("/offers", web::get().to(offer_handlers::list_active_offers_handler))
      .route("/settings", web::get().to(settings_handlers::get_settings_handler))
      .route(
        "/orders/session/{session_id}",
        web::get().to(order_handlers::get_order_by_session_handler),
      )
      .service(
        web::scope("/admin")
          .route("/dashboard", web::get().to(admin_handlers::dashboard_handler))
          .service(
            web::resource("/products")
              .route(web::get().to(product_handlers::admin_list_products_handler))
              .route(web::post().to(product_handlers::create_product_handler)),
          )
          .service(
            web::resource("/products/{product_id}")
              .route(web::put().to(product_handlers::update_product_handler))
              .route(web::delete().to(product_handlers::delete_product_handler)),
          )
          .route("/products/{product_id}/stock", web::put().to(product_handlers::set_stock_handler))
          .service(
            web::resource("/offers")
              .route(web::get().to(offer_handlers::admin_list_offers_handler))
              .route(web::post().to(offer_handlers::create_offer_handler)),
          )
          .service(
            web::resource("/offers/{offer_id}")
              .route(web::put().to(offer_handlers::update_offer_handler))
              .route(web::delete().to(offer_handlers::delete_offer_handler)),
          )
          .route("/offers/{offer_id}/move", web::post().to(offer_handlers::move_offer_handler))
          .service(
            web::resource("/settings")
              .route(web::get().to(settings_handlers::admin_get_settings_handler))
              .route(web::put().to(settings_handlers::update_settings_handler)),
          ),
      ),
  );
}
