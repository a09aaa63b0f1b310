use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
}

/// The user's current entitlement window.
///
/// One row per user: renewal replaces the row (upsert on `user_id`)
/// rather than appending history. Only the payment verifier mutates it.
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub user_id: String,
    pub plan_type: PlanType,
    pub status: SubscriptionStatus,
    pub starts_at: i64,
    pub expires_at: i64,
    /// Gateway payment id of the payment that last activated/renewed this row
    pub razorpay_payment_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}
