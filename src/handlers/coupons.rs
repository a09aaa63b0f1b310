use axum::{extract::State, http::HeaderMap};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::coupons::{self, CouponOutcome};
use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    #[serde(default)]
    pub code: String,
    /// Sent by the client for display purposes; pricing always starts
    /// from the server-side base price.
    #[serde(default)]
    pub base_amount: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<String>,
    pub discount: f64,
    pub message: String,
}

/// Preview what a coupon code is worth. Logical invalidity (unknown,
/// expired, exhausted) is a 200 with discount 0, not an error; only
/// missing auth or infrastructure failures produce error statuses.
pub async fn validate_coupon(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ValidateCouponRequest>,
) -> Result<Json<ValidateCouponResponse>> {
    auth::authenticate(&headers, &state.auth_key)?;

    if request.code.trim().is_empty() {
        return Ok(Json(ValidateCouponResponse {
            coupon_id: None,
            discount: 0.0,
            message: "Coupon code is required".to_string(),
        }));
    }

    let conn = state.db.get()?;
    let now = Utc::now().timestamp();

    let response = match coupons::resolve(&conn, &request.code, state.pricing.base_price, now)? {
        CouponOutcome::Applied(applied) => ValidateCouponResponse {
            coupon_id: Some(applied.coupon_id),
            message: format!("Coupon applied! You save ₹{}", applied.discount),
            discount: applied.discount,
        },
        CouponOutcome::Rejected(rejection) => {
            tracing::debug!(code = %request.code, "coupon rejected: {}", rejection.message());
            ValidateCouponResponse {
                coupon_id: None,
                discount: 0.0,
                message: rejection.message().to_string(),
            }
        }
    };

    Ok(Json(response))
}
