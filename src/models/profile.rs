use serde::Serialize;

/// Minimal user profile, read for checkout prefill only.
///
/// The identity provider owns the canonical record; this table is a
/// convenience mirror keyed by the provider's user id.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
