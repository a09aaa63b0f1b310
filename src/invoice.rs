//! Invoice number derivation.

use chrono::{DateTime, Utc};

/// Build an invoice number of the form `PYG-YYYYMMDD-<token>`.
///
/// The token is the high-entropy tail of the gateway payment id, so the
/// number is collision-resistant without needing a global sequence. It is
/// also deterministic: re-verifying the same payment derives the same
/// number.
pub fn invoice_number(now: DateTime<Utc>, razorpay_payment_id: &str) -> String {
    let token = razorpay_payment_id
        .strip_prefix("pay_")
        .unwrap_or(razorpay_payment_id)
        .to_ascii_uppercase();
    format!("PYG-{}-{}", now.format("%Y%m%d"), token)
}
