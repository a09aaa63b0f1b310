use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

const API_BASE: &str = "https://api.razorpay.com/v1";

/// Audit metadata attached to a gateway order at creation time.
///
/// Echoed back by the gateway on the order object, these tie the remote
/// order to the user and the exact server-computed price breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    pub user_id: String,
    pub coupon_id: Option<String>,
    pub discount: f64,
    pub gst_amount: f64,
    pub base_amount: f64,
}

#[derive(Debug, Serialize)]
struct CreateOrderPayload<'a> {
    /// Integer minor units (paise)
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a OrderNotes,
}

/// A gateway-side order, as returned by the Orders API.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct RazorpayClient {
    client: Client,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    /// The public key id, handed to the client-side checkout widget.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a remote order reserving an exact payable amount.
    ///
    /// The order is the only resource created during checkout; if the
    /// user abandons payment it simply expires at the gateway.
    pub async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
        notes: &OrderNotes,
    ) -> Result<GatewayOrder> {
        let payload = CreateOrderPayload {
            amount: amount_paise,
            currency,
            receipt,
            notes,
        };

        let response = self
            .client
            .post(format!("{}/orders", API_BASE))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("order request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Gateway(format!(
                "order creation rejected ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("invalid order response: {}", e)))
    }

    /// Verify a checkout callback signature.
    ///
    /// The gateway signs `"{order_id}|{payment_id}"` with HMAC-SHA256 under
    /// the shared key secret and hex-encodes the digest. This is the sole
    /// gate protecting subscription activation from forged callbacks.
    pub fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool> {
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .map_err(|_| AppError::Internal("Invalid gateway key secret".into()))?;
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        // Constant-time comparison so response timing reveals nothing
        // about how much of a forged signature matched.
        let expected_bytes = expected.as_bytes();
        let provided_bytes = signature.as_bytes();

        // Length is not secret: a SHA-256 hex digest is always 64 chars.
        if expected_bytes.len() != provided_bytes.len() {
            return Ok(false);
        }

        Ok(expected_bytes.ct_eq(provided_bytes).into())
    }
}
