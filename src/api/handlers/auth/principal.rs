//! Authenticated principal extraction.
//!
//! Flow Overview: read the session cookie or bearer token, resolve it to a
//! user, and return a principal downstream handlers can rely on. Step-up
//! logic never runs without a resolved principal; the session layer fails
//! closed with 401 first.

use axum::http::{HeaderMap, StatusCode};
use sqlx::PgPool;
use uuid::Uuid;

use super::session::authenticate_session;

/// Authenticated user context derived from the session credential.
///
/// Carries only the account id; handlers that need profile fields load the
/// account row themselves.
#[derive(Clone, Copy, Debug)]
pub struct Principal {
    pub user_id: Uuid,
}

/// Resolve a session credential into a principal, or return 401.
pub async fn require_auth(headers: &HeaderMap, pool: &PgPool) -> Result<Principal, StatusCode> {
    match authenticate_session(headers, pool).await {
        Ok(Some(record)) => Ok(Principal {
            user_id: record.user_id,
        }),
        Ok(None) => Err(StatusCode::UNAUTHORIZED),
        Err(status) => Err(status),
    }
}
