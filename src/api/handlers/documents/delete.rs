use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::handlers::auth::principal::require_auth;
use crate::api::handlers::auth::state::AuthState;

use super::storage::delete_document;

/// Delete a document and its stored bytes. The row goes first; a file that
/// fails to unlink is logged and left for operator cleanup.
#[utoipa::path(
    delete,
    path = "/v1/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 204, description = "Document removed"),
        (status = 401, description = "Missing session"),
        (status = 404, description = "Unknown document", body = String)
    ),
    tag = "documents"
)]
pub async fn remove_document(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool).await {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    let Ok(document_id) = Uuid::parse_str(id.trim()) else {
        return (StatusCode::NOT_FOUND, "Not found".to_string()).into_response();
    };

    match delete_document(&pool, principal.user_id, document_id).await {
        Ok(true) => {}
        Ok(false) => return (StatusCode::NOT_FOUND, "Not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to delete document: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Deletion failed".to_string(),
            )
                .into_response();
        }
    }

    let path = auth_state.config().storage_dir().join(document_id.to_string());
    if let Err(err) = tokio::fs::remove_file(&path).await {
        warn!("Failed to remove document file {document_id}: {err}");
    }

    info!(user_id = %principal.user_id, document_id = %document_id, "document deleted");
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use super::super::super::auth::test_support::{auth_state, lazy_pool};
    use super::*;

    #[tokio::test]
    async fn delete_without_session_is_unauthorized() {
        let response = remove_document(
            HeaderMap::new(),
            lazy_pool(),
            auth_state(),
            Path("b9e2fdde-3f04-4c73-8f5a-000000000000".to_string()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
