use axum::{extract::State, http::HeaderMap};
use chrono::{Months, Utc};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::coupons;
use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::invoice;
use crate::models::CreatePayment;

/// Checkout callback payload, schema-checked before any use. The
/// `razorpay_*` identifiers are named by the gateway; the rest comes
/// from the client app.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(rename = "razorpay_order_id")]
    pub razorpay_order_id: String,
    #[serde(rename = "razorpay_payment_id")]
    pub razorpay_payment_id: String,
    #[serde(rename = "razorpay_signature")]
    pub razorpay_signature: String,
    #[serde(default)]
    pub coupon_id: Option<String>,
    #[serde(default)]
    pub base_amount: Option<f64>,
    #[serde(default)]
    pub gst_amount: Option<f64>,
    #[serde(default)]
    pub discount_amount: Option<f64>,
    #[serde(default)]
    pub total_amount: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub invoice_number: String,
}

/// Verify a payment callback and activate the subscription.
///
/// Nothing is written until the signature over `"{order_id}|{payment_id}"`
/// checks out, so a rejected callback needs no rollback. After the gate,
/// payment insert, subscription upsert and coupon increment commit as one
/// transaction.
///
/// The signature binds the order and payment ids, not the amounts, so the
/// recorded breakdown is re-derived server-side from configured pricing
/// plus the coupon record; the client-supplied figures are only compared
/// for audit logging.
pub async fn verify_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>> {
    let user = auth::authenticate(&headers, &state.auth_key)?;
    let razorpay = state.razorpay.as_ref().ok_or(AppError::GatewayNotConfigured)?;

    let verified = razorpay.verify_payment_signature(
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
    )?;
    if !verified {
        tracing::warn!(
            order_id = %request.razorpay_order_id,
            payment_id = %request.razorpay_payment_id,
            user_id = %user.user_id,
            "payment signature mismatch"
        );
        return Err(AppError::VerificationFailed);
    }

    let mut conn = state.db.get()?;

    // Re-verifying an already-recorded payment is a safe no-op: return
    // the stored invoice instead of double-activating.
    if let Some(existing) =
        queries::get_payment_by_gateway_payment_id(&conn, &request.razorpay_payment_id)?
    {
        if existing.user_id != user.user_id {
            return Err(AppError::BadRequest("Payment already recorded".into()));
        }
        return Ok(Json(VerifyPaymentResponse {
            success: true,
            invoice_number: existing.invoice_number,
        }));
    }

    let now = Utc::now();

    // Canonical amounts, independent of the callback body.
    let (discount, coupon_id) = match request.coupon_id.as_deref() {
        Some(id) => match queries::get_coupon_by_id(&conn, id)? {
            Some(coupon) => (
                coupons::discount_for(&coupon, state.pricing.base_price),
                Some(coupon.id),
            ),
            None => {
                tracing::warn!(coupon_id = %id, "unknown coupon id on verified payment");
                (0.0, None)
            }
        },
        None => (0.0, None),
    };
    let breakdown = state.pricing.quote(discount);

    if let Some(client_total) = request.total_amount
        && (client_total - breakdown.total).abs() > 0.005
    {
        tracing::warn!(
            payment_id = %request.razorpay_payment_id,
            client_total,
            server_total = breakdown.total,
            "client-supplied total disagrees with server pricing"
        );
    }

    let expires_at = now
        .checked_add_months(Months::new(12))
        .ok_or_else(|| AppError::Internal("Expiry date overflow".into()))?;

    let invoice_number = invoice::invoice_number(now, &request.razorpay_payment_id);

    let recorded = queries::record_verified_payment(
        &mut conn,
        &CreatePayment {
            user_id: user.user_id.clone(),
            razorpay_order_id: request.razorpay_order_id.clone(),
            razorpay_payment_id: request.razorpay_payment_id.clone(),
            razorpay_signature: request.razorpay_signature.clone(),
            base_amount: state.pricing.base_price,
            gst_amount: breakdown.gst,
            discount_amount: discount,
            total_amount: breakdown.total,
            coupon_id,
            invoice_number,
        },
        now.timestamp(),
        expires_at.timestamp(),
    );

    // A concurrent verification of the same payment can slip past the
    // existence check above and lose the insert race; the winner's row
    // is what we would have returned anyway.
    let payment = match recorded {
        Ok(payment) => payment,
        Err(err) => {
            if let AppError::Database(ref e) = err
                && queries::is_unique_violation(e)
                && let Some(existing) = queries::get_payment_by_gateway_payment_id(
                    &conn,
                    &request.razorpay_payment_id,
                )?
            {
                if existing.user_id != user.user_id {
                    return Err(AppError::BadRequest("Payment already recorded".into()));
                }
                return Ok(Json(VerifyPaymentResponse {
                    success: true,
                    invoice_number: existing.invoice_number,
                }));
            }
            return Err(err);
        }
    };

    tracing::info!(
        payment_id = %payment.razorpay_payment_id,
        user_id = %user.user_id,
        invoice = %payment.invoice_number,
        "payment verified, subscription active until {}",
        expires_at.format("%Y-%m-%d")
    );

    Ok(Json(VerifyPaymentResponse {
        success: true,
        invoice_number: payment.invoice_number,
    }))
}
