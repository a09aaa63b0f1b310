//! Bearer-token authentication against the external identity provider.
//!
//! The provider mints HS256 JWTs with the user id in `sub` and the email
//! as a custom claim; this server only verifies them with the shared
//! secret. Session management (refresh, revocation) stays with the
//! provider.

use axum::http::HeaderMap;
use jwt_simple::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Custom claims carried alongside the registered ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub email: Option<String>,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user_id: String,
    pub email: Option<String>,
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Authenticate a request. Any failure collapses to `Unauthorized`; the
/// specific reason is only logged.
pub fn authenticate(headers: &HeaderMap, key: &HS256Key) -> Result<AuthedUser> {
    let token = extract_bearer_token(headers).ok_or(AppError::Unauthorized)?;

    let claims = key
        .verify_token::<IdentityClaims>(token, None)
        .map_err(|e| {
            tracing::debug!("Bearer token rejected: {}", e);
            AppError::Unauthorized
        })?;

    let user_id = claims.subject.ok_or(AppError::Unauthorized)?;

    Ok(AuthedUser {
        user_id,
        email: claims.custom.email,
    })
}
