// storefront/tests/http_tests.rs

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storefront_app::config::AppConfig;
use storefront_app::services::admin_auth::hash_token;
use storefront_app::state::AppState;
use storefront_app::web::configure_app_routes;
use storefront_core::checkout::{HostedSession, PaymentProvider, SessionSpec};
use storefront_core::models::ProductInput;
use storefront_core::store::{InMemoryStore, ProductStore};
use storefront_core::{StoreResult, WebhookVerifier};
use uuid::Uuid;

const WEBHOOK_SECRET: &str = "whsec_http_tests";
const ADMIN_TOKEN: &str = "admin-token-for-tests";

#[derive(Default)]
struct FakeProvider {
  calls: AtomicUsize,
}

#[async_trait]
impl PaymentProvider for FakeProvider {
  async fn create_session(&self, spec: &SessionSpec) -> StoreResult<HostedSession> {
    let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(HostedSession {
      id: format!("cs_http_{}", n),
      url: format!("https://checkout.stripe.test/pay/cs_http_{}?amount={}", n, spec.unit_amount),
    })
  }
}

fn config(with_secrets: bool) -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: "postgres://unused".to_string(),
    database_max_connections: 1,
    public_base_url: "http://localhost:3000".to_string(),
    stripe_secret_key: with_secrets.then(|| "sk_test_unused".to_string()),
    stripe_webhook_secret: with_secrets.then(|| WEBHOOK_SECRET.to_string()),
    stripe_api_base: "http://127.0.0.1:9".to_string(),
    checkout_currency: "brl".to_string(),
    admin_token_hash: Some(hash_token(ADMIN_TOKEN).unwrap()),
    run_migrations: false,
  }
}

struct Harness {
  store: Arc<InMemoryStore>,
  provider: Arc<FakeProvider>,
  state: AppState,
}

fn harness(with_secrets: bool) -> Harness {
  let store = Arc::new(InMemoryStore::new());
  let provider = Arc::new(FakeProvider::default());
  let provider_dyn = with_secrets.then(|| provider.clone() as Arc<dyn PaymentProvider>);
  let state = AppState::with_provider(Arc::new(config(with_secrets)), store.clone(), provider_dyn);
  Harness { store, provider, state }
}

async fn seed(store: &InMemoryStore, name: &str, price: &str, stock: i32) -> Uuid {
  store
    .create_product(&ProductInput {
      name: name.to_string(),
      category: "lighting".to_string(),
      description: String::new(),
      price: Decimal::from_str(price).unwrap(),
      stock,
      image_url: String::new(),
      active: true,
    })
    .await
    .unwrap()
    .id
}

fn completed_event(session_id: &str, product_id: Uuid) -> String {
  json!({
    "id": "evt_http",
    "type": "checkout.session.completed",
    "data": { "object": {
      "id": session_id,
      "amount_total": 4990,
      "metadata": { "productId": product_id.to_string() }
    }}
  })
  .to_string()
}

fn signed(payload: &str) -> String {
  WebhookVerifier::new(WEBHOOK_SECRET)
    .sign(payload.as_bytes(), Utc::now().timestamp())
    .unwrap()
}

fn bearer() -> (&'static str, String) {
  ("Authorization", format!("Bearer {}", ADMIN_TOKEN))
}

macro_rules! app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

#[actix_web::test]
async fn health_reports_ok() {
  let h = harness(true);
  let app = app!(h.state);
  let resp: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/v1/health").to_request()).await;
  assert_eq!(resp, json!({ "status": "ok" }));
}

#[actix_web::test]
async fn checkout_returns_redirect_url_and_session_id() {
  let h = harness(true);
  let lamp = seed(&h.store, "Desk Lamp", "49.90", 3).await;
  let app = app!(h.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/checkout")
    .set_json(json!({ "productId": lamp, "productName": "Desk Lamp", "price": 49.90 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["sessionId"], "cs_http_1");
  assert_eq!(body["url"], "https://checkout.stripe.test/pay/cs_http_1?amount=4990");
  assert_eq!(h.provider.calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn checkout_without_credentials_is_a_server_error() {
  let h = harness(false);
  let lamp = seed(&h.store, "Desk Lamp", "49.90", 3).await;
  let app = app!(h.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/checkout")
    .set_json(json!({ "productId": lamp, "productName": "Desk Lamp", "price": 49.90 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["error"].as_str().unwrap().contains("not configured"));
  assert_eq!(h.provider.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn checkout_with_malformed_body_is_a_bad_request() {
  let h = harness(true);
  let app = app!(h.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/checkout")
    .set_json(json!({ "productName": "No id" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["error"].is_string());
}

#[actix_web::test]
async fn webhook_fulfills_once_and_acknowledges_redelivery() {
  let h = harness(true);
  let lamp = seed(&h.store, "Desk Lamp", "49.90", 3).await;
  let app = app!(h.state);
  let payload = completed_event("cs_http_done", lamp);

  for _ in 0..2 {
    let req = test::TestRequest::post()
      .uri("/api/v1/webhooks/stripe")
      .insert_header(("stripe-signature", signed(&payload)))
      .set_payload(payload.clone())
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers().get("access-control-allow-origin").unwrap().to_str().unwrap(),
      "*"
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "received": true }));
  }

  assert_eq!(h.store.get_product(lamp).await.unwrap().unwrap().stock, 2);
  assert_eq!(h.store.order_count(), 1);

  let order: Value = test::call_and_read_body_json(
    &app,
    test::TestRequest::get().uri("/api/v1/orders/session/cs_http_done").to_request(),
  )
  .await;
  assert_eq!(order["quantity"], 1);
  assert_eq!(order["status"], "completed");
}

#[actix_web::test]
async fn webhook_without_signature_is_rejected() {
  let h = harness(true);
  let lamp = seed(&h.store, "Desk Lamp", "49.90", 3).await;
  let app = app!(h.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/webhooks/stripe")
    .set_payload(completed_event("cs_unsigned", lamp))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "error": "No signature provided" }));
  assert_eq!(h.store.order_count(), 0);
}

#[actix_web::test]
async fn webhook_with_bad_signature_is_rejected() {
  let h = harness(true);
  let lamp = seed(&h.store, "Desk Lamp", "49.90", 3).await;
  let app = app!(h.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/webhooks/stripe")
    .insert_header(("stripe-signature", format!("t={},v1={}", Utc::now().timestamp(), "ab".repeat(32))))
    .set_payload(completed_event("cs_forged", lamp))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(h.store.get_product(lamp).await.unwrap().unwrap().stock, 3);
}

#[actix_web::test]
async fn webhook_without_configured_secret_is_a_server_error() {
  let h = harness(false);
  let app = app!(h.state);
  let payload = completed_event("cs_nosecret", Uuid::new_v4());

  let req = test::TestRequest::post()
    .uri("/api/v1/webhooks/stripe")
    .insert_header(("stripe-signature", signed(&payload)))
    .set_payload(payload)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn webhook_preflight_is_answered_with_cors_headers() {
  let h = harness(true);
  let app = app!(h.state);

  let req = test::TestRequest::default()
    .method(actix_web::http::Method::OPTIONS)
    .uri("/api/v1/webhooks/stripe")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let allowed = resp.headers().get("access-control-allow-headers").unwrap().to_str().unwrap();
  assert!(allowed.contains("stripe-signature"));
  assert_eq!(
    resp.headers().get("access-control-allow-methods").unwrap().to_str().unwrap(),
    "POST, OPTIONS"
  );
}

#[actix_web::test]
async fn storefront_catalog_hides_inactive_products() {
  let h = harness(true);
  let lamp = seed(&h.store, "Desk Lamp", "49.90", 3).await;
  let app = app!(h.state);

  let req = test::TestRequest::put()
    .uri(&format!("/api/v1/admin/products/{}", lamp))
    .insert_header(bearer())
    .set_json(json!({ "name": "Desk Lamp", "price": 49.90, "stock": 3, "active": false }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let products: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/v1/products").to_request()).await;
  assert_eq!(products, json!([]));

  let resp = test::call_service(
    &app,
    test::TestRequest::get().uri(&format!("/api/v1/products/{}", lamp)).to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_routes_require_the_bearer_token() {
  let h = harness(true);
  let app = app!(h.state);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/admin/dashboard").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri("/api/v1/admin/dashboard")
      .insert_header(("Authorization", "Bearer wrong"))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri("/api/v1/admin/dashboard")
      .insert_header(bearer())
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let stats: Value = test::read_body_json(resp).await;
  assert_eq!(stats["total_products"], 0);
}

#[actix_web::test]
async fn admin_can_create_products_and_offers_and_reorder() {
  let h = harness(true);
  let app = app!(h.state);

  let req = test::TestRequest::post()
    .uri("/api/v1/admin/products")
    .insert_header(bearer())
    .set_json(json!({ "name": "Chair", "category": "seating", "price": 150.0, "stock": 4 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let chair: Value = test::read_body_json(resp).await;
  assert_eq!(chair["active"], true);

  let req = test::TestRequest::post()
    .uri("/api/v1/admin/products")
    .insert_header(bearer())
    .set_json(json!({ "name": "Broken", "price": 1.0, "stock": -1 }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let mut offer_ids = Vec::new();
  for title in ["first", "second"] {
    let req = test::TestRequest::post()
      .uri("/api/v1/admin/offers")
      .insert_header(bearer())
      .set_json(json!({ "title": title, "image_url": "https://cdn.example.com/x.png" }))
      .to_request();
    let offer: Value = test::call_and_read_body_json(&app, req).await;
    offer_ids.push(offer["id"].as_str().unwrap().to_string());
  }

  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/admin/offers/{}/move", offer_ids[1]))
    .insert_header(bearer())
    .set_json(json!({ "direction": "up" }))
    .to_request();
  let moved: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(moved[0]["title"], "second");
  assert_eq!(moved[0]["order_position"], 0);
  assert_eq!(moved[1]["title"], "first");

  let offers: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/v1/offers").to_request()).await;
  assert_eq!(offers.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn settings_updates_are_validated_and_reflected_on_the_storefront() {
  let h = harness(true);
  let app = app!(h.state);

  let req = test::TestRequest::put()
    .uri("/api/v1/admin/settings")
    .insert_header(bearer())
    .set_json(json!({ "primary_color": "red" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::put()
    .uri("/api/v1/admin/settings")
    .insert_header(bearer())
    .set_json(json!({ "store_name": "Lamp House", "show_offers": false }))
    .to_request();
  let settings: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(settings["store_name"], "Lamp House");
  assert_eq!(settings["primary_color"], "#1f3048");

  let page: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/v1/storefront").to_request()).await;
  assert_eq!(page["settings"]["store_name"], "Lamp House");
  assert_eq!(page["offers"], json!([]));
}

#[actix_web::test]
async fn unknown_order_session_is_not_found() {
  let h = harness(true);
  let app = app!(h.state);
  let resp = test::call_service(
    &app,
    test::TestRequest::get().uri("/api/v1/orders/session/cs_missing").to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["error"].is_string());
}
