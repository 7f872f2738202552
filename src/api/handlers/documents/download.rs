//! Document download endpoint. Secure documents additionally require a
//! valid step-up download token scoped to the document id.

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::handlers::auth::principal::require_auth;
use crate::api::handlers::auth::state::AuthState;
use crate::api::handlers::stepup::download as token;

use super::storage::lookup_document;
use super::types::DownloadQuery;

/// Every failure mode is the same 404 so a caller cannot tell a missing
/// document from a missing or rejected token.
fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Not found".to_string())
}

#[utoipa::path(
    get,
    path = "/v1/documents/{id}/download",
    params(
        ("id" = String, Path, description = "Document id"),
        ("token" = Option<String>, Query, description = "Step-up download token, required for secure documents")
    ),
    responses(
        (status = 200, description = "Document bytes"),
        (status = 401, description = "Missing session"),
        (status = 404, description = "Unknown document or rejected token", body = String)
    ),
    tag = "documents"
)]
pub async fn download_document(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Path(id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool).await {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    let Ok(document_id) = Uuid::parse_str(id.trim()) else {
        return not_found().into_response();
    };

    let record = match lookup_document(&pool, principal.user_id, document_id).await {
        Ok(Some(record)) => record,
        Ok(None) => return not_found().into_response(),
        Err(err) => {
            error!("Failed to look up document: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Download failed".to_string(),
            )
                .into_response();
        }
    };

    if record.secure {
        let Some(presented) = query.token.as_deref() else {
            warn!(document_id = %document_id, "secure download without token");
            return not_found().into_response();
        };
        if !token::verify(
            auth_state.download_token_key(),
            presented,
            document_id,
            token::now_millis(),
        ) {
            warn!(document_id = %document_id, "secure download with rejected token");
            return not_found().into_response();
        }
    }

    let path = auth_state.config().storage_dir().join(record.id.to_string());
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("Failed to read document {}: {err}", record.id);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Download failed".to_string(),
            )
                .into_response();
        }
    };

    info!(
        user_id = %principal.user_id,
        document_id = %record.id,
        secure = record.secure,
        "document downloaded"
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, record.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", record.name.replace('"', "")),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::super::super::auth::test_support::{auth_state, lazy_pool};
    use super::*;

    #[tokio::test]
    async fn download_without_session_is_unauthorized() {
        let response = download_document(
            HeaderMap::new(),
            lazy_pool(),
            auth_state(),
            Path("b9e2fdde-3f04-4c73-8f5a-000000000000".to_string()),
            Query(DownloadQuery { token: None }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
