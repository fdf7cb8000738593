//! Append-only audit trail.
//!
//! Entries are written only by the mutation pipeline, inside the same
//! transaction as the domain write they describe. The table rejects UPDATE and
//! DELETE at the storage level.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

use commissary_core::{AuditEntryId, UserId};

use crate::error::{map_sqlx_error, PipelineError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub actor_id: UserId,
    pub actor_username: String,
    pub action: String,
    pub occurred_at: DateTime<Utc>,
    pub details: String,
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: Uuid,
    actor_id: Uuid,
    actor_username: String,
    action: String,
    occurred_at: DateTime<Utc>,
    details: String,
}

impl From<AuditRow> for AuditEntry {
    fn from(row: AuditRow) -> Self {
        Self {
            id: AuditEntryId::from_uuid(row.id),
            actor_id: UserId::from_uuid(row.actor_id),
            actor_username: row.actor_username,
            action: row.action,
            occurred_at: row.occurred_at,
            details: row.details,
        }
    }
}

pub(crate) async fn append(
    conn: &mut SqliteConnection,
    actor_id: UserId,
    action: &str,
    occurred_at: DateTime<Utc>,
    details: &str,
) -> Result<AuditEntryId, PipelineError> {
    let id = AuditEntryId::new();
    sqlx::query("INSERT INTO audit_log (id, actor_id, action, occurred_at, details) VALUES (?, ?, ?, ?, ?)")
        .bind(*id.as_uuid())
        .bind(*actor_id.as_uuid())
        .bind(action)
        .bind(occurred_at)
        .bind(details)
        .execute(conn)
        .await
        .map_err(|e| map_sqlx_error("append_audit_entry", e))?;
    Ok(id)
}

/// Most recent entries first.
pub(crate) async fn recent(conn: &mut SqliteConnection, limit: u32) -> Result<Vec<AuditEntry>, PipelineError> {
    let rows = sqlx::query_as::<_, AuditRow>(
        "SELECT a.id, a.actor_id, u.username AS actor_username, a.action, a.occurred_at, a.details
         FROM audit_log a JOIN users u ON u.id = a.actor_id
         ORDER BY a.rowid DESC
         LIMIT ?",
    )
    .bind(i64::from(limit))
    .fetch_all(conn)
    .await
    .map_err(|e| map_sqlx_error("recent_audit_entries", e))?;
    Ok(rows.into_iter().map(AuditEntry::from).collect())
}
