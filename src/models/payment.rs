use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// The only status ever written: rows exist solely for verified,
    /// captured transactions.
    Captured,
}

/// Immutable record of one verified transaction.
///
/// Written exactly once, inside the activation transaction, and never
/// updated afterwards. Amounts are the server-derived breakdown, kept
/// for invoice/audit reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub base_amount: f64,
    pub gst_amount: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub coupon_id: Option<String>,
    pub status: PaymentStatus,
    pub invoice_number: String,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub user_id: String,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub base_amount: f64,
    pub gst_amount: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub coupon_id: Option<String>,
    pub invoice_number: String,
}
