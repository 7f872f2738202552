//! Step-up request endpoint: password re-verification and code dispatch.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

use crate::api::delivery::DeliveryOutcome;
use crate::api::handlers::auth::principal::require_auth;
use crate::api::handlers::auth::rate_limit::{RateLimitAction, RateLimitDecision};
use crate::api::handlers::auth::state::AuthState;
use crate::api::handlers::auth::storage::lookup_account;
use crate::api::handlers::auth::utils::{extract_client_ip, verify_password};

use super::code::{DOWNLOAD_PURPOSE, generate_code};
use super::ledger;
use super::types::{StepUpRequest, StepUpResponse};

/// Start a step-up cycle: prove the password again, then receive a one-time
/// code over email and SMS.
///
/// The ledger row is written before delivery is attempted, so a delivered
/// code is always findable. At least one successful channel makes the
/// request succeed; if both fail the row stays behind unused (the sweep
/// collects it) and the caller must start over.
#[utoipa::path(
    post,
    path = "/v1/stepup/request",
    request_body = StepUpRequest,
    responses(
        (status = 200, description = "Code issued and delivered", body = StepUpResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Missing session or invalid credentials", body = String),
        (status = 429, description = "Rate limited", body = String),
        (status = 503, description = "No delivery channel succeeded", body = StepUpResponse)
    ),
    tag = "stepup"
)]
pub async fn request_step_up(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<StepUpRequest>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool).await {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    let request: StepUpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };
    if request.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing password".to_string()).into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::StepUpRequest)
        == RateLimitDecision::Limited
        || auth_state
            .rate_limiter()
            .check_account(principal.user_id, RateLimitAction::StepUpRequest)
            == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }

    let account = match lookup_account(&pool, principal.user_id).await {
        Ok(account) => account,
        Err(err) => {
            error!("Step-up account lookup failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Step-up failed".to_string(),
            )
                .into_response();
        }
    };

    // A vanished account and a wrong password get the same response.
    let Some(account) = account else {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response();
    };
    if !verify_password(&account.password_hash, &request.password) {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response();
    }

    let code = generate_code();
    let ttl_seconds = auth_state.config().otc_ttl_seconds();

    // Ledger insert happens-before delivery; never dispatch an unrecorded code.
    if let Err(err) = ledger::issue(
        &pool,
        account.user_id,
        &code,
        DOWNLOAD_PURPOSE,
        ttl_seconds,
    )
    .await
    {
        error!("Failed to issue one-time code: {err}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Step-up failed".to_string(),
        )
            .into_response();
    }

    let report = auth_state
        .gateway()
        .send_both(
            &account.email,
            &account.phone,
            &code,
            validity_minutes(ttl_seconds),
        )
        .await;

    match report.outcome() {
        DeliveryOutcome::Full | DeliveryOutcome::Degraded => {
            info!(
                user_id = %account.user_id,
                email_ok = report.email_ok,
                sms_ok = report.sms_ok,
                "step-up code issued"
            );
            (
                StatusCode::OK,
                Json(StepUpResponse {
                    success: true,
                    message: report.summary(),
                }),
            )
                .into_response()
        }
        DeliveryOutcome::Failed => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StepUpResponse {
                success: false,
                message: report.summary(),
            }),
        )
            .into_response(),
    }
}

/// Validity window for the delivery message. Sub-minute TTLs round up so
/// the message never claims the code is valid for zero minutes.
const fn validity_minutes(ttl_seconds: i64) -> i64 {
    let minutes = ttl_seconds / 60;
    if minutes < 1 { 1 } else { minutes }
}

#[cfg(test)]
mod tests {
    use super::super::super::auth::test_support::{auth_state, lazy_pool};
    use super::*;

    #[test]
    fn validity_minutes_never_renders_zero() {
        assert_eq!(validity_minutes(300), 5);
        assert_eq!(validity_minutes(60), 1);
        assert_eq!(validity_minutes(59), 1);
        assert_eq!(validity_minutes(1), 1);
    }

    #[tokio::test]
    async fn request_missing_session_is_unauthorized() {
        let response = request_step_up(HeaderMap::new(), lazy_pool(), auth_state(), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
