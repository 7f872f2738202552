use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

use crate::api::handlers::auth::principal::require_auth;
use crate::api::handlers::auth::state::AuthState;

use super::storage::insert_document;
use super::types::{DocumentResponse, UploadDocumentRequest};

const MAX_DOCUMENT_BYTES: usize = 25 * 1024 * 1024;

/// Upload a document. The metadata row is inserted first so the file name
/// on disk is the generated row id; a failed write removes the row again.
#[utoipa::path(
    post,
    path = "/v1/documents",
    request_body = UploadDocumentRequest,
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Missing session"),
        (status = 500, description = "Storage failure", body = String)
    ),
    tag = "documents"
)]
pub async fn upload_document(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<UploadDocumentRequest>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool).await {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    let request: UploadDocumentRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let name = request.name.trim();
    if name.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing document name".to_string()).into_response();
    }
    let category = request.category.trim();
    if category.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing category".to_string()).into_response();
    }
    let content_type = request.content_type.trim();
    if content_type.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing content type".to_string()).into_response();
    }

    let Ok(bytes) = STANDARD.decode(request.data_base64.as_bytes()) else {
        return (StatusCode::BAD_REQUEST, "Invalid base64 payload".to_string()).into_response();
    };
    if bytes.is_empty() {
        return (StatusCode::BAD_REQUEST, "Empty document".to_string()).into_response();
    }
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return (StatusCode::BAD_REQUEST, "Document too large".to_string()).into_response();
    }

    let record = match insert_document(
        &pool,
        principal.user_id,
        name,
        category,
        content_type,
        request.secure,
        bytes.len() as i64,
    )
    .await
    {
        Ok(record) => record,
        Err(err) => {
            error!("Failed to insert document: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Upload failed".to_string())
                .into_response();
        }
    };

    let path = auth_state.config().storage_dir().join(record.id.to_string());
    if let Err(err) = tokio::fs::write(&path, &bytes).await {
        error!("Failed to write document {}: {err}", record.id);
        if let Err(err) = super::storage::delete_document(&pool, principal.user_id, record.id).await
        {
            error!("Failed to remove orphaned document row {}: {err}", record.id);
        }
        return (StatusCode::INTERNAL_SERVER_ERROR, "Upload failed".to_string()).into_response();
    }

    info!(
        user_id = %principal.user_id,
        document_id = %record.id,
        secure = record.secure,
        "document uploaded"
    );

    (
        StatusCode::CREATED,
        Json(DocumentResponse {
            id: record.id.to_string(),
            name: record.name,
            category: record.category,
            content_type: record.content_type,
            secure: record.secure,
            size_bytes: record.size_bytes,
            created_at: record.created_at.to_rfc3339(),
        }),
    )
        .into_response()
}
