use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the base price
    Percentage,
    /// `discount_value` is a flat rupee amount
    Fixed,
}

/// A named discount rule with a validity window and usage cap.
///
/// Codes are stored uppercase; lookups normalize before matching.
/// `times_used` is only ever moved by verified payments, through the
/// guarded increment in `db::queries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    /// Cap on the computed discount (mostly for percentage coupons)
    pub max_discount: Option<f64>,
    /// Unix seconds
    pub valid_from: i64,
    /// Unix seconds; None = no expiry
    pub valid_until: Option<i64>,
    /// None = unlimited redemptions
    pub max_uses: Option<i64>,
    pub times_used: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub max_discount: Option<f64>,
    pub valid_from: i64,
    pub valid_until: Option<i64>,
    pub max_uses: Option<i64>,
}
