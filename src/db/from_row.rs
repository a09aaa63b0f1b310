//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on bad stored values.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

// ============ SQL SELECT Constants ============

pub const COUPON_COLS: &str = "id, code, discount_type, discount_value, max_discount, valid_from, valid_until, max_uses, times_used, is_active, created_at, updated_at";

pub const PAYMENT_COLS: &str = "id, user_id, razorpay_order_id, razorpay_payment_id, razorpay_signature, base_amount, gst_amount, discount_amount, total_amount, coupon_id, status, invoice_number, created_at";

pub const SUBSCRIPTION_COLS: &str =
    "user_id, plan_type, status, starts_at, expires_at, razorpay_payment_id, created_at, updated_at";

pub const PROFILE_COLS: &str = "id, full_name, created_at, updated_at";

// ============ FromRow impls ============

impl FromRow for Coupon {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Coupon {
            id: row.get(0)?,
            code: row.get(1)?,
            discount_type: parse_enum(row, 2, "discount_type")?,
            discount_value: row.get(3)?,
            max_discount: row.get(4)?,
            valid_from: row.get(5)?,
            valid_until: row.get(6)?,
            max_uses: row.get(7)?,
            times_used: row.get(8)?,
            is_active: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

impl FromRow for Payment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Payment {
            id: row.get(0)?,
            user_id: row.get(1)?,
            razorpay_order_id: row.get(2)?,
            razorpay_payment_id: row.get(3)?,
            razorpay_signature: row.get(4)?,
            base_amount: row.get(5)?,
            gst_amount: row.get(6)?,
            discount_amount: row.get(7)?,
            total_amount: row.get(8)?,
            coupon_id: row.get(9)?,
            status: parse_enum(row, 10, "status")?,
            invoice_number: row.get(11)?,
            created_at: row.get(12)?,
        })
    }
}

impl FromRow for Subscription {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Subscription {
            user_id: row.get(0)?,
            plan_type: parse_enum(row, 1, "plan_type")?,
            status: parse_enum(row, 2, "status")?,
            starts_at: row.get(3)?,
            expires_at: row.get(4)?,
            razorpay_payment_id: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl FromRow for Profile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Profile {
            id: row.get(0)?,
            full_name: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }
}
