//! One-time-code ledger behavior against a live Postgres.
//!
//! The suite needs a throwaway database and is skipped unless
//! `CUSTODIA_TEST_DSN` is set, for example:
//!
//! ```sh
//! CUSTODIA_TEST_DSN=postgres://postgres@localhost/custodia_test \
//!     cargo test --test step_up_ledger
//! ```
//!
//! The schema is dropped and re-applied on every run, so never point the
//! DSN at a database holding real data.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use custodia::api::handlers::stepup::code::DOWNLOAD_PURPOSE;
use custodia::api::handlers::stepup::ledger;

const SCHEMA_SQL: &str = include_str!("../migrations/0001_init.sql");

async fn connect() -> Result<Option<PgPool>> {
    let Ok(dsn) = std::env::var("CUSTODIA_TEST_DSN") else {
        eprintln!("CUSTODIA_TEST_DSN not set; skipping ledger tests");
        return Ok(None);
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&dsn)
        .await
        .context("Failed to connect to the test database")?;
    sqlx::raw_sql("DROP TABLE IF EXISTS documents, one_time_codes, user_sessions, users CASCADE")
        .execute(&pool)
        .await
        .context("Failed to reset the test schema")?;
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(&pool)
        .await
        .context("Failed to apply the schema")?;
    Ok(Some(pool))
}

async fn insert_user(pool: &PgPool) -> Result<Uuid> {
    let email = format!("{}@ledger.example", Uuid::new_v4());
    let row = sqlx::query(
        "INSERT INTO users (display_name, email, phone, password_hash)
         VALUES ('Ledger Test', $1, '+15550000000', 'unused')
         RETURNING id",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .context("Failed to insert test user")?;
    Ok(row.get("id"))
}

#[tokio::test]
async fn code_lifecycle_issue_consume_expire_sweep() -> Result<()> {
    let Some(pool) = connect().await? else {
        return Ok(());
    };
    let user_id = insert_user(&pool).await?;

    // Two outstanding rows with the same code; the newest one wins lookup.
    let first = ledger::issue(&pool, user_id, "123456", DOWNLOAD_PURPOSE, 300).await?;
    let second = ledger::issue(&pool, user_id, "123456", DOWNLOAD_PURPOSE, 300).await?;
    let found = ledger::find_active(&pool, user_id, "123456", DOWNLOAD_PURPOSE).await?;
    assert_eq!(found, Some(second));

    // A code that was never issued does not match.
    let unknown = ledger::find_active(&pool, user_id, "000000", DOWNLOAD_PURPOSE).await?;
    assert_eq!(unknown, None);

    // Consuming the newest row leaves the older one redeemable; issuing a
    // new code never invalidated it.
    assert!(ledger::consume(&pool, second).await?);
    let remaining = ledger::find_active(&pool, user_id, "123456", DOWNLOAD_PURPOSE).await?;
    assert_eq!(remaining, Some(first));

    // Double consume is a no-op, not an error.
    assert!(!ledger::consume(&pool, second).await?);

    assert!(ledger::consume(&pool, first).await?);
    let spent = ledger::find_active(&pool, user_id, "123456", DOWNLOAD_PURPOSE).await?;
    assert_eq!(spent, None);

    // Zero TTL puts `expires_at` at issuance time; the strict comparison in
    // the lookup already rejects it on the next statement.
    ledger::issue(&pool, user_id, "654321", DOWNLOAD_PURPOSE, 0).await?;
    let expired = ledger::find_active(&pool, user_id, "654321", DOWNLOAD_PURPOSE).await?;
    assert_eq!(expired, None);

    // Sweep collects both consumed rows and the expired one.
    let removed = ledger::sweep(&pool).await?;
    assert_eq!(removed, 3);

    Ok(())
}
