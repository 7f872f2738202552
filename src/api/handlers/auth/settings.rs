//! Account settings: password change and account deletion.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, warn};

use crate::api::handlers::documents::storage::list_document_ids;

use super::principal::require_auth;
use super::state::AuthState;
use super::storage::{delete_user, lookup_account, update_password_hash};
use super::types::{ChangePasswordRequest, DeleteAccountRequest};
use super::utils::{hash_password, verify_password};

const MIN_PASSWORD_LEN: usize = 10;

/// Change the caller's password after proving the current one.
#[utoipa::path(
    post,
    path = "/v1/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Missing session or invalid credentials", body = String)
    ),
    tag = "auth"
)]
pub async fn change_password(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool).await {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    let request: ChangePasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };
    if request.new_password.len() < MIN_PASSWORD_LEN {
        return (StatusCode::BAD_REQUEST, "Password too short".to_string()).into_response();
    }

    let account = match lookup_account(&pool, principal.user_id).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response();
        }
        Err(err) => {
            error!("Password change lookup failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Password change failed".to_string(),
            )
                .into_response();
        }
    };
    if !verify_password(&account.password_hash, &request.current_password) {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response();
    }

    let new_hash = match hash_password(&request.new_password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Password change failed".to_string(),
            )
                .into_response();
        }
    };
    match update_password_hash(&pool, principal.user_id, &new_hash).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!("Failed to update password hash: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Password change failed".to_string(),
            )
                .into_response()
        }
    }
}

/// Delete the caller's account, documents, sessions, and codes.
#[utoipa::path(
    delete,
    path = "/v1/auth/account",
    request_body = DeleteAccountRequest,
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Missing session or invalid credentials", body = String)
    ),
    tag = "auth"
)]
pub async fn delete_account(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<DeleteAccountRequest>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool).await {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    let request: DeleteAccountRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let account = match lookup_account(&pool, principal.user_id).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response();
        }
        Err(err) => {
            error!("Account deletion lookup failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Account deletion failed".to_string(),
            )
                .into_response();
        }
    };
    if !verify_password(&account.password_hash, &request.password) {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response();
    }

    // Collect file names before the row cascade removes the metadata.
    let document_ids = match list_document_ids(&pool, principal.user_id).await {
        Ok(ids) => ids,
        Err(err) => {
            error!("Failed to list documents for deletion: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Account deletion failed".to_string(),
            )
                .into_response();
        }
    };

    if let Err(err) = delete_user(&pool, principal.user_id).await {
        error!("Failed to delete user: {err}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Account deletion failed".to_string(),
        )
            .into_response();
    }

    // Stored bytes are best-effort cleanup; the rows are already gone.
    for id in document_ids {
        let path = auth_state.config().storage_dir().join(id.to_string());
        if let Err(err) = tokio::fs::remove_file(&path).await {
            warn!("Failed to remove stored file {}: {err}", path.display());
        }
    }

    StatusCode::NO_CONTENT.into_response()
}
