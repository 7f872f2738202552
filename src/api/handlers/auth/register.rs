//! Account registration endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use super::storage::{RegisterOutcome, insert_user};
use super::types::RegisterRequest;
use super::utils::{
    extract_client_ip, hash_password, normalize_email, valid_email, valid_phone,
};

const MIN_PASSWORD_LEN: usize = 10;

/// Create a new account with a unique email and a hashed password.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Validation error", body = String),
        (status = 409, description = "Email already registered", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "auth"
)]
pub async fn register(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let display_name = request.display_name.trim();
    if display_name.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing display name".to_string()).into_response();
    }
    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }
    if !valid_phone(&request.phone) {
        return (StatusCode::BAD_REQUEST, "Invalid phone number".to_string()).into_response();
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return (StatusCode::BAD_REQUEST, "Password too short".to_string()).into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::Register)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }

    let password_hash = match hash_password(&request.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
    };

    match insert_user(&pool, display_name, &email, request.phone.trim(), &password_hash).await {
        Ok(RegisterOutcome::Created) => StatusCode::CREATED.into_response(),
        Ok(RegisterOutcome::Conflict) => (
            StatusCode::CONFLICT,
            "Email already registered".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to insert user: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{auth_state, lazy_pool};
    use super::*;

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            display_name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "+15551230000".to_string(),
            password: "long-enough-password".to_string(),
        }
    }

    #[tokio::test]
    async fn register_missing_payload() {
        let response = register(HeaderMap::new(), lazy_pool(), auth_state(), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() {
        let mut request = valid_request();
        request.email = "not-an-email".to_string();
        let response = register(
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
    async fn register_rejects_invalid_phone() {
        let mut request = valid_request();
        request.phone = "bogus".to_string();
        let response = register(
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
    async fn register_rejects_short_password() {
        let mut request = valid_request();
        request.password = "short".to_string();
        let response = register(
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
