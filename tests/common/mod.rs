//! Test utilities and fixtures for Playoga billing integration tests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use hmac::{Hmac, Mac};
use jwt_simple::prelude::*;
use rusqlite::Connection;
use serde_json::Value;
use sha2::Sha256;

pub use playoga_billing::auth::IdentityClaims;
pub use playoga_billing::coupons::{self, AppliedCoupon, CouponOutcome, CouponRejection};
pub use playoga_billing::db::{AppState, DbPool, init_db, queries};
pub use playoga_billing::models::*;
pub use playoga_billing::payments::RazorpayClient;
pub use playoga_billing::pricing::PricingConfig;

pub const TEST_AUTH_SECRET: &[u8] = b"playoga-test-secret";
pub const TEST_GATEWAY_KEY_ID: &str = "rzp_test_abc123";
pub const TEST_GATEWAY_SECRET: &str = "gateway-test-secret";

pub const ONE_HOUR: i64 = 3600;
pub const ONE_DAY: i64 = 86400;

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Create an in-memory database pool with the schema initialized.
///
/// The pool is capped at a single connection so every request sees the
/// same in-memory database.
pub fn test_pool() -> DbPool {
    let manager = r2d2_sqlite::SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("Failed to create in-memory pool");
    {
        let conn = pool.get().expect("Failed to get pooled connection");
        init_db(&conn).expect("Failed to initialize schema");
    }
    pool
}

pub fn create_test_app_state() -> AppState {
    AppState {
        db: test_pool(),
        auth_key: HS256Key::from_bytes(TEST_AUTH_SECRET),
        razorpay: Some(RazorpayClient::new(TEST_GATEWAY_KEY_ID, TEST_GATEWAY_SECRET)),
        pricing: PricingConfig::default(),
    }
}

/// State with no gateway credentials configured.
pub fn state_without_gateway() -> AppState {
    AppState {
        razorpay: None,
        ..create_test_app_state()
    }
}

pub fn billing_app(state: AppState) -> Router {
    playoga_billing::handlers::router().with_state(state)
}

/// Mint a bearer token the way the identity provider would.
pub fn mint_token(user_id: &str, email: Option<&str>) -> String {
    let key = HS256Key::from_bytes(TEST_AUTH_SECRET);
    let custom = IdentityClaims {
        email: email.map(String::from),
    };
    let claims = Claims::with_custom_claims(custom, Duration::from_hours(2)).with_subject(user_id);
    key.authenticate(claims).expect("Failed to mint test token")
}

/// Compute the signature Razorpay would attach to a checkout callback.
pub fn sign_payment(order_id: &str, payment_id: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(TEST_GATEWAY_SECRET.as_bytes())
        .expect("Failed to build HMAC");
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// A valid coupon input with overridable defaults (10% off, started an
/// hour ago, no expiry or cap).
pub fn percent_coupon(code: &str, value: f64) -> CreateCoupon {
    CreateCoupon {
        code: code.to_string(),
        discount_type: DiscountType::Percentage,
        discount_value: value,
        max_discount: None,
        valid_from: now() - ONE_HOUR,
        valid_until: None,
        max_uses: None,
    }
}

pub fn fixed_coupon(code: &str, value: f64) -> CreateCoupon {
    CreateCoupon {
        discount_type: DiscountType::Fixed,
        ..percent_coupon(code, value)
    }
}

pub fn create_test_coupon(conn: &Connection, input: &CreateCoupon) -> Coupon {
    queries::create_coupon(conn, input).expect("Failed to create test coupon")
}

/// Build a POST request with a JSON body and optional bearer token.
pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("Response should be valid JSON")
}
