use chrono::Utc;
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

use super::from_row::{
    COUPON_COLS, PAYMENT_COLS, PROFILE_COLS, SUBSCRIPTION_COLS, query_one,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Whether an error is a UNIQUE constraint violation. Callers racing on
/// `payments.razorpay_payment_id` use this to tell "already recorded"
/// apart from a real failure.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

// ============ Coupons ============

/// Create a coupon. The code is stored uppercase so lookups can match
/// exactly after normalization.
pub fn create_coupon(conn: &Connection, input: &CreateCoupon) -> Result<Coupon> {
    let id = gen_id();
    let now = now();
    let code = input.code.trim().to_uppercase();

    conn.execute(
        "INSERT INTO coupons (id, code, discount_type, discount_value, max_discount,
                              valid_from, valid_until, max_uses, times_used, is_active,
                              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, 1, ?9, ?10)",
        params![
            &id,
            &code,
            input.discount_type.to_string(),
            input.discount_value,
            input.max_discount,
            input.valid_from,
            input.valid_until,
            input.max_uses,
            now,
            now
        ],
    )?;

    Ok(Coupon {
        id,
        code,
        discount_type: input.discount_type,
        discount_value: input.discount_value,
        max_discount: input.max_discount,
        valid_from: input.valid_from,
        valid_until: input.valid_until,
        max_uses: input.max_uses,
        times_used: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

/// Look up an active coupon by code (case-insensitive).
pub fn get_active_coupon_by_code(conn: &Connection, code: &str) -> Result<Option<Coupon>> {
    let normalized = code.trim().to_uppercase();
    query_one(
        conn,
        &format!(
            "SELECT {} FROM coupons WHERE code = ?1 AND is_active = 1",
            COUPON_COLS
        ),
        &[&normalized],
    )
}

pub fn get_coupon_by_id(conn: &Connection, id: &str) -> Result<Option<Coupon>> {
    query_one(
        conn,
        &format!("SELECT {} FROM coupons WHERE id = ?1", COUPON_COLS),
        &[&id],
    )
}

/// Atomically bump a coupon's usage counter.
///
/// The guard keeps `times_used` at or below `max_uses` under concurrent
/// redemptions; a plain read-modify-write would lose updates. Returns
/// false when the cap was already reached (or the id is unknown).
pub fn increment_coupon_usage(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE coupons
         SET times_used = times_used + 1, updated_at = ?2
         WHERE id = ?1 AND (max_uses IS NULL OR times_used < max_uses)",
        params![id, now()],
    )?;
    Ok(affected > 0)
}

// ============ Profiles ============

pub fn get_profile(conn: &Connection, user_id: &str) -> Result<Option<Profile>> {
    query_one(
        conn,
        &format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLS),
        &[&user_id],
    )
}

pub fn upsert_profile(conn: &Connection, user_id: &str, full_name: Option<&str>) -> Result<Profile> {
    let now = now();
    conn.execute(
        "INSERT INTO profiles (id, full_name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)
         ON CONFLICT(id) DO UPDATE SET full_name = excluded.full_name, updated_at = excluded.updated_at",
        params![user_id, full_name, now],
    )?;
    get_profile(conn, user_id)?
        .ok_or_else(|| crate::error::AppError::Internal("Profile upsert lost".into()))
}

// ============ Payments ============

/// Find a previously recorded payment by the gateway's payment id.
/// Used to make verification idempotent.
pub fn get_payment_by_gateway_payment_id(
    conn: &Connection,
    razorpay_payment_id: &str,
) -> Result<Option<Payment>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM payments WHERE razorpay_payment_id = ?1",
            PAYMENT_COLS
        ),
        &[&razorpay_payment_id],
    )
}

fn insert_payment(conn: &Connection, input: &CreatePayment, created_at: i64) -> Result<Payment> {
    let id = gen_id();

    conn.execute(
        "INSERT INTO payments (id, user_id, razorpay_order_id, razorpay_payment_id,
                               razorpay_signature, base_amount, gst_amount, discount_amount,
                               total_amount, coupon_id, status, invoice_number, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            &id,
            &input.user_id,
            &input.razorpay_order_id,
            &input.razorpay_payment_id,
            &input.razorpay_signature,
            input.base_amount,
            input.gst_amount,
            input.discount_amount,
            input.total_amount,
            &input.coupon_id,
            PaymentStatus::Captured.to_string(),
            &input.invoice_number,
            created_at
        ],
    )?;

    Ok(Payment {
        id,
        user_id: input.user_id.clone(),
        razorpay_order_id: input.razorpay_order_id.clone(),
        razorpay_payment_id: input.razorpay_payment_id.clone(),
        razorpay_signature: input.razorpay_signature.clone(),
        base_amount: input.base_amount,
        gst_amount: input.gst_amount,
        discount_amount: input.discount_amount,
        total_amount: input.total_amount,
        coupon_id: input.coupon_id.clone(),
        status: PaymentStatus::Captured,
        invoice_number: input.invoice_number.clone(),
        created_at,
    })
}

fn upsert_subscription(
    conn: &Connection,
    user_id: &str,
    starts_at: i64,
    expires_at: i64,
    razorpay_payment_id: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO subscriptions (user_id, plan_type, status, starts_at, expires_at,
                                    razorpay_payment_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?4, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
             plan_type = excluded.plan_type,
             status = excluded.status,
             starts_at = excluded.starts_at,
             expires_at = excluded.expires_at,
             razorpay_payment_id = excluded.razorpay_payment_id,
             updated_at = excluded.updated_at",
        params![
            user_id,
            PlanType::Yearly.to_string(),
            SubscriptionStatus::Active.to_string(),
            starts_at,
            expires_at,
            razorpay_payment_id
        ],
    )?;
    Ok(())
}

/// Record a verified payment and activate the subscription, as one unit.
///
/// Payment insert, subscription upsert and coupon increment commit
/// together or not at all, so a crash mid-sequence cannot leave an
/// orphaned payment row without an entitlement.
pub fn record_verified_payment(
    conn: &mut Connection,
    input: &CreatePayment,
    starts_at: i64,
    expires_at: i64,
) -> Result<Payment> {
    let tx = conn.transaction()?;

    let payment = insert_payment(&tx, input, starts_at)?;
    upsert_subscription(
        &tx,
        &input.user_id,
        starts_at,
        expires_at,
        &input.razorpay_payment_id,
    )?;

    if let Some(ref coupon_id) = input.coupon_id
        && !increment_coupon_usage(&tx, coupon_id)?
    {
        // The payment already went through at the gateway; keep the
        // activation and leave the counter at its cap.
        tracing::warn!(
            coupon_id = %coupon_id,
            payment_id = %input.razorpay_payment_id,
            "coupon usage cap reached before increment"
        );
    }

    tx.commit()?;
    Ok(payment)
}

// ============ Subscriptions ============

pub fn get_subscription(conn: &Connection, user_id: &str) -> Result<Option<Subscription>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM subscriptions WHERE user_id = ?1",
            SUBSCRIPTION_COLS
        ),
        &[&user_id],
    )
}

pub fn count_subscriptions(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM subscriptions", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_payments(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM payments", [], |row| row.get(0))?;
    Ok(count)
}
