//! SQLite connection pool and schema.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Idempotent DDL, applied in order.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            BLOB PRIMARY KEY NOT NULL,
        username      TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL CHECK (role IN ('Admin', 'Staff', 'Trustee')),
        first_name    TEXT NOT NULL,
        last_name     TEXT NOT NULL,
        email         TEXT,
        created_at    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inmates (
        id                 TEXT PRIMARY KEY NOT NULL,
        name               TEXT NOT NULL,
        housing_unit       TEXT NOT NULL,
        accrued_fees_cents INTEGER NOT NULL DEFAULT 0 CHECK (accrued_fees_cents >= 0),
        notes              TEXT NOT NULL DEFAULT '',
        released_at        TEXT,
        created_at         TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id          BLOB PRIMARY KEY NOT NULL,
        barcode     TEXT NOT NULL UNIQUE,
        name        TEXT NOT NULL,
        type_code   TEXT NOT NULL,
        size_code   TEXT NOT NULL,
        vendor      TEXT,
        cost_cents  INTEGER NOT NULL CHECK (cost_cents >= 0),
        condition   TEXT NOT NULL,
        status      TEXT NOT NULL,
        notes       TEXT NOT NULL DEFAULT '',
        created_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS retired_barcodes (
        barcode    TEXT PRIMARY KEY NOT NULL,
        retired_at TEXT NOT NULL,
        reason     TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS items_reject_retired_barcode
    BEFORE INSERT ON items
    WHEN EXISTS (SELECT 1 FROM retired_barcodes WHERE barcode = NEW.barcode)
    BEGIN
        SELECT RAISE(ABORT, 'retired barcode');
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS items_barcode_immutable
    BEFORE UPDATE OF barcode ON items
    WHEN NEW.barcode <> OLD.barcode
    BEGIN
        SELECT RAISE(ABORT, 'barcode is immutable');
    END
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS item_assignments (
        id               BLOB PRIMARY KEY NOT NULL,
        item_id          BLOB NOT NULL REFERENCES items(id),
        inmate_id        TEXT NOT NULL REFERENCES inmates(id),
        assigned_at      TEXT NOT NULL,
        returned_at      TEXT,
        outcome          TEXT,
        return_condition TEXT
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS item_assignments_one_open
    ON item_assignments (item_id) WHERE returned_at IS NULL
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS item_assignments_by_inmate
    ON item_assignments (inmate_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fees (
        id            BLOB PRIMARY KEY NOT NULL,
        name          TEXT NOT NULL,
        amount_cents  INTEGER NOT NULL CHECK (amount_cents > 0),
        inmate_id     TEXT REFERENCES inmates(id),
        item_barcodes TEXT NOT NULL DEFAULT '',
        notes         TEXT NOT NULL DEFAULT '',
        applied_at    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS fees_by_inmate ON fees (inmate_id)
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS fees_no_update
    BEFORE UPDATE ON fees
    BEGIN
        SELECT RAISE(ABORT, 'fees are append-only');
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS fees_no_delete
    BEFORE DELETE ON fees
    BEGIN
        SELECT RAISE(ABORT, 'fees are append-only');
    END
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS audit_log (
        id          BLOB PRIMARY KEY NOT NULL,
        actor_id    BLOB NOT NULL REFERENCES users(id),
        action      TEXT NOT NULL,
        occurred_at TEXT NOT NULL,
        details     TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS audit_log_no_update
    BEFORE UPDATE ON audit_log
    BEGIN
        SELECT RAISE(ABORT, 'audit log is append-only');
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS audit_log_no_delete
    BEFORE DELETE ON audit_log
    BEGIN
        SELECT RAISE(ABORT, 'audit log is append-only');
    END
    "#,
];

/// Shared handle to the relational store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) a file-backed database.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url '{url}'"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database '{url}'"))?;

        info!(url, max_connections, "database connected");
        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests and benchmarks.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid in-memory database url")?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the schema. Safe to run on every start.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("schema statement failed: {}", first_line(statement)))?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn first_line(statement: &str) -> &str {
    statement.trim().lines().next().unwrap_or_default()
}
