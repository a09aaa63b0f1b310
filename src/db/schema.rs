use rusqlite::Connection;

/// Initialize the billing schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Coupons (created by the admin surface; times_used moved only by
        -- verified payments via the guarded increment)
        CREATE TABLE IF NOT EXISTS coupons (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            discount_type TEXT NOT NULL CHECK (discount_type IN ('percentage', 'fixed')),
            discount_value REAL NOT NULL,
            max_discount REAL,
            valid_from INTEGER NOT NULL,
            valid_until INTEGER,
            max_uses INTEGER,
            times_used INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            CHECK (max_uses IS NULL OR times_used <= max_uses)
        );
        CREATE INDEX IF NOT EXISTS idx_coupons_code ON coupons(code) WHERE is_active = 1;

        -- Payments (one immutable row per verified transaction)
        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            razorpay_order_id TEXT NOT NULL,
            razorpay_payment_id TEXT NOT NULL UNIQUE,
            razorpay_signature TEXT NOT NULL,
            base_amount REAL NOT NULL,
            gst_amount REAL NOT NULL,
            discount_amount REAL NOT NULL DEFAULT 0,
            total_amount REAL NOT NULL,
            coupon_id TEXT REFERENCES coupons(id),
            status TEXT NOT NULL CHECK (status IN ('captured')),
            invoice_number TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_payments_user ON payments(user_id);

        -- Subscriptions (one row per user, replaced on renewal)
        CREATE TABLE IF NOT EXISTS subscriptions (
            user_id TEXT PRIMARY KEY,
            plan_type TEXT NOT NULL CHECK (plan_type IN ('yearly')),
            status TEXT NOT NULL CHECK (status IN ('active', 'expired')),
            starts_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            razorpay_payment_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Profiles (checkout prefill; mirrored from the identity provider)
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            full_name TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        "#,
    )
}
