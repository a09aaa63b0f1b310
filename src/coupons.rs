//! Coupon validation, shared by the preview endpoint and the order issuer.
//!
//! Both callers go through [`resolve`] so a code always produces the same
//! discount for the same base amount and instant. The client never supplies
//! a discount value; it is recomputed here every time.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;
use crate::models::{Coupon, DiscountType};

/// Why a coupon did not apply. Rejections are normal responses on the
/// preview path, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRejection {
    InvalidCode,
    Expired,
    UsageLimitReached,
}

impl CouponRejection {
    pub fn message(&self) -> &'static str {
        match self {
            CouponRejection::InvalidCode => "Invalid coupon code",
            CouponRejection::Expired => "Coupon has expired",
            CouponRejection::UsageLimitReached => "Coupon usage limit reached",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCoupon {
    pub coupon_id: String,
    pub discount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CouponOutcome {
    Applied(AppliedCoupon),
    Rejected(CouponRejection),
}

/// Raw discount for a coupon against a base amount, before validity checks.
///
/// Percentage discounts round to the nearest rupee (half away from zero);
/// fixed discounts are taken as-is. A `max_discount` cap clamps either kind.
pub fn discount_for(coupon: &Coupon, base_amount: f64) -> f64 {
    let raw = match coupon.discount_type {
        DiscountType::Percentage => (base_amount * coupon.discount_value / 100.0).round(),
        DiscountType::Fixed => coupon.discount_value,
    };
    match coupon.max_discount {
        Some(cap) if raw > cap => cap,
        _ => raw,
    }
}

/// Apply the temporal and usage rules to an already-fetched coupon.
///
/// The validity window is inclusive at both ends: `now == valid_until`
/// still applies, one second later does not.
pub fn evaluate(coupon: &Coupon, base_amount: f64, now: i64) -> CouponOutcome {
    if now < coupon.valid_from {
        return CouponOutcome::Rejected(CouponRejection::Expired);
    }
    if let Some(valid_until) = coupon.valid_until
        && now > valid_until
    {
        return CouponOutcome::Rejected(CouponRejection::Expired);
    }

    if let Some(max_uses) = coupon.max_uses
        && coupon.times_used >= max_uses
    {
        return CouponOutcome::Rejected(CouponRejection::UsageLimitReached);
    }

    CouponOutcome::Applied(AppliedCoupon {
        coupon_id: coupon.id.clone(),
        discount: discount_for(coupon, base_amount),
    })
}

/// Look up a code and evaluate it. Read-only: previews leave `times_used`
/// untouched, so calling this twice with the same inputs yields the same
/// outcome.
pub fn resolve(
    conn: &Connection,
    code: &str,
    base_amount: f64,
    now: i64,
) -> Result<CouponOutcome> {
    match queries::get_active_coupon_by_code(conn, code)? {
        Some(coupon) => Ok(evaluate(&coupon, base_amount, now)),
        None => Ok(CouponOutcome::Rejected(CouponRejection::InvalidCode)),
    }
}
