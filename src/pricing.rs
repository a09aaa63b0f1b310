//! Pure price computation for the yearly plan.
//!
//! Amounts are rupees with two-decimal precision; the gateway is always
//! handed integer paise. All three handlers share the same `PricingConfig`
//! so the base price and GST rate cannot drift between them.

/// Plan pricing injected from configuration.
#[derive(Debug, Clone, Copy)]
pub struct PricingConfig {
    /// Base price of the yearly plan, in rupees
    pub base_price: f64,
    /// GST applied on the discounted subtotal
    pub gst_rate: f64,
}

impl PricingConfig {
    pub const DEFAULT_BASE_PRICE: f64 = 999.0;
    pub const DEFAULT_GST_RATE: f64 = 0.05;

    /// Compute the breakdown for this plan with the given discount.
    pub fn quote(&self, discount: f64) -> PriceBreakdown {
        price(self.base_price, discount, self.gst_rate)
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_price: Self::DEFAULT_BASE_PRICE,
            gst_rate: Self::DEFAULT_GST_RATE,
        }
    }
}

/// Subtotal / GST / total for a single checkout, in rupees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown {
    pub subtotal: f64,
    pub gst: f64,
    pub total: f64,
}

impl PriceBreakdown {
    /// Total converted to integer paise for the gateway order.
    pub fn total_paise(&self) -> i64 {
        (self.total * 100.0).round() as i64
    }
}

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute subtotal, GST and total from a base amount and a discount.
///
/// The subtotal is clamped at zero: callers cap discounts at the base
/// price, but the clamp keeps an oversized discount from producing a
/// negative charge.
pub fn price(base: f64, discount: f64, gst_rate: f64) -> PriceBreakdown {
    let subtotal = (base - discount).max(0.0);
    let gst = round2(subtotal * gst_rate);
    let total = round2(subtotal + gst);
    PriceBreakdown { subtotal, gst, total }
}
