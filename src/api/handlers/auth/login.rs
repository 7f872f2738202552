//! Password login endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::session::session_cookie;
use super::state::AuthState;
use super::storage::{insert_session, lookup_account_by_email};
use super::types::{LoginRequest, LoginResponse};
use super::utils::{extract_client_ip, normalize_email, valid_email, verify_password};

/// Exchange email + password for a session cookie.
///
/// Unknown account and wrong password are deliberately indistinguishable.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created", body = LoginResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Invalid credentials", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) || request.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing credentials".to_string()).into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::Login)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }

    let account = match lookup_account_by_email(&pool, &email).await {
        Ok(account) => account,
        Err(err) => {
            error!("Login lookup failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response();
        }
    };

    // One uniform response for "no such account" and "wrong password".
    let Some(account) = account else {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response();
    };
    if !verify_password(&account.password_hash, &request.password) {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response();
    }

    let token = match insert_session(
        &pool,
        account.user_id,
        auth_state.config().session_ttl_seconds(),
    )
    .await
    {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to insert session: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    match session_cookie(&auth_state, &token) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response();
        }
    }

    let response = LoginResponse {
        user_id: account.user_id.to_string(),
        display_name: account.display_name,
    };
    (StatusCode::OK, response_headers, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{auth_state, lazy_pool};
    use super::*;

    #[tokio::test]
    async fn login_missing_payload() {
        let response = login(HeaderMap::new(), lazy_pool(), auth_state(), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_rejects_empty_password() {
        let request = LoginRequest {
            email: "alice@example.com".to_string(),
            password: String::new(),
        };
        let response = login(
            HeaderMap::new(),
            lazy_pool(),
            auth_state(),
            Some(Json(request)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_rejects_invalid_email() {
        let request = LoginRequest {
            email: "nope".to_string(),
            password: "secret-password".to_string(),
        };
        let response = login(
            HeaderMap::new(),
            lazy_pool(),
            auth_state(),
            Some(Json(request)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
