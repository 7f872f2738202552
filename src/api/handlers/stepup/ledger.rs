//! One-time-code ledger: durable bookkeeping of issued codes.
//!
//! Rows are inserted when a step-up password check succeeds, consumed
//! exactly once on successful verification, and otherwise never mutated.
//! Expired and consumed rows are garbage-collected by the periodic sweep;
//! correctness never depends on the sweep because every read filters on
//! `consumed_at` and `expires_at`.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

/// Insert one ledger row. Pure insert; no uniqueness enforcement beyond the
/// generated id, and no invalidation of earlier codes for the same purpose.
pub async fn issue(
    pool: &PgPool,
    user_id: Uuid,
    code: &str,
    purpose: &str,
    ttl_seconds: i64,
) -> Result<Uuid> {
    let query = r"
        INSERT INTO one_time_codes (user_id, code, purpose, expires_at)
        VALUES ($1, $2, $3, NOW() + ($4 * INTERVAL '1 second'))
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(code)
        .bind(purpose)
        .bind(ttl_seconds)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert one-time code")?;
    Ok(row.get("id"))
}

/// Find the newest unconsumed, unexpired row matching (account, code,
/// purpose). The expiry comparison is strict: a code submitted at exactly
/// `expires_at` no longer matches.
pub async fn find_active(
    pool: &PgPool,
    user_id: Uuid,
    code: &str,
    purpose: &str,
) -> Result<Option<Uuid>> {
    let query = r"
        SELECT id
        FROM one_time_codes
        WHERE user_id = $1
          AND code = $2
          AND purpose = $3
          AND consumed_at IS NULL
          AND expires_at > NOW()
        ORDER BY created_at DESC
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(code)
        .bind(purpose)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to look up one-time code")?;
    Ok(row.map(|row| row.get("id")))
}

/// Mark a row consumed. Returns whether a row actually changed, so a
/// double-consume attempt is a safe no-op rather than an error.
pub async fn consume(pool: &PgPool, id: Uuid) -> Result<bool> {
    let query = r"
        UPDATE one_time_codes
        SET consumed_at = NOW()
        WHERE id = $1
          AND consumed_at IS NULL
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to consume one-time code")?;
    Ok(result.rows_affected() > 0)
}

/// Delete consumed or expired rows. Storage hygiene only; idempotent and
/// order-independent, so the caller can fire and forget.
pub async fn sweep(pool: &PgPool) -> Result<u64> {
    let query = r"
        DELETE FROM one_time_codes
        WHERE consumed_at IS NOT NULL
           OR expires_at <= NOW()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to sweep one-time codes")?;
    Ok(result.rows_affected())
}
