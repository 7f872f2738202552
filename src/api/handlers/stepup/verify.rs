//! Step-up verification endpoint: redeem a code, mint a download token.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::handlers::auth::principal::require_auth;
use crate::api::handlers::auth::rate_limit::{RateLimitAction, RateLimitDecision};
use crate::api::handlers::auth::state::AuthState;
use crate::api::handlers::auth::utils::extract_client_ip;

use super::code::DOWNLOAD_PURPOSE;
use super::download;
use super::ledger;
use super::types::{VerifyCodeRequest, VerifyCodeResponse};

fn rejection() -> (StatusCode, Json<VerifyCodeResponse>) {
    // "Wrong code" and "expired code" are deliberately the same response so
    // response differences cannot be used to distinguish states.
    (
        StatusCode::BAD_REQUEST,
        Json(VerifyCodeResponse {
            success: false,
            message: "Invalid or expired code".to_string(),
            download_token: None,
        }),
    )
}

/// Redeem a one-time code. On success the code is consumed and a signed,
/// short-lived token scoped to the requested document is returned.
#[utoipa::path(
    post,
    path = "/v1/stepup/verify",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Code accepted", body = VerifyCodeResponse),
        (status = 400, description = "Invalid or expired code", body = VerifyCodeResponse),
        (status = 401, description = "Missing session"),
        (status = 429, description = "Too many failed attempts", body = String)
    ),
    tag = "stepup"
)]
pub async fn verify_step_up(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyCodeRequest>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool).await {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    let request: VerifyCodeRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let code = request.code.trim();
    if code.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing code".to_string()).into_response();
    }
    let Ok(document_id) = Uuid::parse_str(request.document_id.trim()) else {
        return (StatusCode::BAD_REQUEST, "Invalid document id".to_string()).into_response();
    };

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::StepUpVerify)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }

    // Lockout wraps verification without changing its contract: the window
    // counts consecutive failures per account.
    if auth_state.lockout().is_locked(principal.user_id) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many failed attempts".to_string(),
        )
            .into_response();
    }

    let ledger_id =
        match ledger::find_active(&pool, principal.user_id, code, DOWNLOAD_PURPOSE).await {
            Ok(ledger_id) => ledger_id,
            Err(err) => {
                error!("Code lookup failed: {err}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Verification failed".to_string(),
                )
                    .into_response();
            }
        };

    let Some(ledger_id) = ledger_id else {
        auth_state.lockout().record_failure(principal.user_id);
        return rejection().into_response();
    };

    match ledger::consume(&pool, ledger_id).await {
        // rows_affected == 0 means another request consumed it first; the
        // code is no longer redeemable, same rejection as no match.
        Ok(false) => {
            auth_state.lockout().record_failure(principal.user_id);
            return rejection().into_response();
        }
        Ok(true) => {}
        Err(err) => {
            error!("Failed to consume one-time code: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Verification failed".to_string(),
            )
                .into_response();
        }
    }

    auth_state.lockout().clear(principal.user_id);

    let token = download::mint(
        auth_state.download_token_key(),
        document_id,
        download::now_millis(),
        auth_state.config().download_token_ttl_seconds(),
    );
    info!(user_id = %principal.user_id, document_id = %document_id, "step-up verified");

    (
        StatusCode::OK,
        Json(VerifyCodeResponse {
            success: true,
            message: "Code accepted".to_string(),
            download_token: Some(token),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::super::super::auth::test_support::{auth_state, lazy_pool};
    use super::*;

    #[tokio::test]
    async fn verify_missing_session_is_unauthorized() {
        let response = verify_step_up(HeaderMap::new(), lazy_pool(), auth_state(), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
