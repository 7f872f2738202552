//! SQL access for document metadata rows. Bytes live on disk under the
//! configured storage directory, keyed by the row id.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub(crate) struct DocumentRecord {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub content_type: String,
    pub secure: bool,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> DocumentRecord {
    DocumentRecord {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        content_type: row.get("content_type"),
        secure: row.get("secure"),
        size_bytes: row.get("size_bytes"),
        created_at: row.get("created_at"),
    }
}

pub(crate) async fn insert_document(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    category: &str,
    content_type: &str,
    secure: bool,
    size_bytes: i64,
) -> Result<DocumentRecord> {
    let query = r"
        INSERT INTO documents (user_id, name, category, content_type, secure, size_bytes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, category, content_type, secure, size_bytes, created_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(name)
        .bind(category)
        .bind(content_type)
        .bind(secure)
        .bind(size_bytes)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert document")?;
    Ok(record_from_row(&row))
}

pub(crate) async fn list_documents(pool: &PgPool, user_id: Uuid) -> Result<Vec<DocumentRecord>> {
    let query = r"
        SELECT id, name, category, content_type, secure, size_bytes, created_at
        FROM documents
        WHERE user_id = $1
        ORDER BY created_at DESC
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list documents")?;
    Ok(rows.iter().map(record_from_row).collect())
}

/// Fetch one document, owner-scoped. A row owned by someone else is the
/// same as no row.
pub(crate) async fn lookup_document(
    pool: &PgPool,
    user_id: Uuid,
    document_id: Uuid,
) -> Result<Option<DocumentRecord>> {
    let query = r"
        SELECT id, name, category, content_type, secure, size_bytes, created_at
        FROM documents
        WHERE id = $1
          AND user_id = $2
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(document_id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to look up document")?;
    Ok(row.as_ref().map(record_from_row))
}

pub(crate) async fn delete_document(
    pool: &PgPool,
    user_id: Uuid,
    document_id: Uuid,
) -> Result<bool> {
    let query = r"
        DELETE FROM documents
        WHERE id = $1
          AND user_id = $2
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(document_id)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete document")?;
    Ok(result.rows_affected() > 0)
}

/// Ids of every document a user owns. Used when an account is deleted to
/// remove the stored bytes after the rows cascade away.
pub(crate) async fn list_document_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>> {
    let query = r"
        SELECT id
        FROM documents
        WHERE user_id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list document ids")?;
    Ok(rows.iter().map(|row| row.get("id")).collect())
}
