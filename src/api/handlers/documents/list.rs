use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::error;

use crate::api::handlers::auth::principal::require_auth;

use super::storage::list_documents;
use super::types::{DocumentListResponse, DocumentResponse};

/// List the caller's documents, newest first.
#[utoipa::path(
    get,
    path = "/v1/documents",
    responses(
        (status = 200, description = "Document metadata", body = DocumentListResponse),
        (status = 401, description = "Missing session")
    ),
    tag = "documents"
)]
pub async fn list_user_documents(
    headers: HeaderMap,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool).await {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    let records = match list_documents(&pool, principal.user_id).await {
        Ok(records) => records,
        Err(err) => {
            error!("Failed to list documents: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Listing failed".to_string(),
            )
                .into_response();
        }
    };

    let documents = records
        .into_iter()
        .map(|record| DocumentResponse {
            id: record.id.to_string(),
            name: record.name,
            category: record.category,
            content_type: record.content_type,
            secure: record.secure,
            size_bytes: record.size_bytes,
            created_at: record.created_at.to_rfc3339(),
        })
        .collect();

    (StatusCode::OK, Json(DocumentListResponse { documents })).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::super::auth::test_support::lazy_pool;
    use super::*;

    #[tokio::test]
    async fn list_without_session_is_unauthorized() {
        let response = list_user_documents(HeaderMap::new(), lazy_pool())
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
