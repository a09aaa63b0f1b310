use axum::{extract::State, http::HeaderMap};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::coupons::{self, CouponOutcome};
use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::payments::OrderNotes;

const CURRENCY: &str = "INR";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Identifies the plan on the client; the charged amount is always
    /// recomputed from the server-side base price.
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefill {
    pub name: String,
    pub email: String,
}

/// Price breakdown echoed to the client; `userId` stays in the gateway
/// notes only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotesSummary {
    pub coupon_id: Option<String>,
    pub discount: f64,
    pub gst_amount: f64,
    pub base_amount: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Integer minor units (paise)
    pub amount: i64,
    pub currency: String,
    /// Gateway public key id for the checkout widget
    pub key_id: String,
    pub prefill: Prefill,
    pub notes: OrderNotesSummary,
}

/// Create a gateway order for the yearly plan.
///
/// The coupon is re-validated here from the code; an invalid one silently
/// degrades to no discount since pricing integrity is server-enforced
/// either way. Nothing is persisted locally - the remote order expires
/// unconsumed if the user abandons checkout.
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    let user = auth::authenticate(&headers, &state.auth_key)?;
    let razorpay = state.razorpay.as_ref().ok_or(AppError::GatewayNotConfigured)?;

    let conn = state.db.get()?;
    let now = Utc::now();

    let (discount, coupon_id) = match request.coupon_code.as_deref() {
        Some(code) if !code.trim().is_empty() => {
            match coupons::resolve(&conn, code, state.pricing.base_price, now.timestamp())? {
                CouponOutcome::Applied(applied) => (applied.discount, Some(applied.coupon_id)),
                CouponOutcome::Rejected(rejection) => {
                    tracing::debug!(
                        code = %code,
                        "coupon rejected at order creation: {}",
                        rejection.message()
                    );
                    (0.0, None)
                }
            }
        }
        _ => (0.0, None),
    };

    let breakdown = state.pricing.quote(discount);
    let amount_paise = breakdown.total_paise();

    // Best-effort prefill; a missing profile is not fatal.
    let name = queries::get_profile(&conn, &user.user_id)?
        .and_then(|p| p.full_name)
        .unwrap_or_default();

    let receipt = format!(
        "sub_{}_{}",
        user.user_id.chars().take(8).collect::<String>(),
        now.timestamp_millis()
    );

    let notes = OrderNotes {
        user_id: user.user_id.clone(),
        coupon_id: coupon_id.clone(),
        discount,
        gst_amount: breakdown.gst,
        base_amount: state.pricing.base_price,
    };

    let order = razorpay
        .create_order(amount_paise, CURRENCY, &receipt, &notes)
        .await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        amount_paise,
        coupon = coupon_id.as_deref().unwrap_or("-"),
        "gateway order created"
    );

    Ok(Json(CreateOrderResponse {
        order_id: order.id,
        amount: amount_paise,
        currency: CURRENCY.to_string(),
        key_id: razorpay.key_id().to_string(),
        prefill: Prefill {
            name,
            email: user.email.unwrap_or_default(),
        },
        notes: OrderNotesSummary {
            coupon_id,
            discount,
            gst_amount: breakdown.gst,
            base_amount: state.pricing.base_price,
        },
    }))
}
