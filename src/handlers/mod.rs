pub mod coupons;
pub mod orders;
pub mod verify;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/coupons/validate", post(coupons::validate_coupon))
        .route("/orders", post(orders::create_order))
        .route("/payments/verify", post(verify::verify_payment))
}
