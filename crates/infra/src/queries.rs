//! Read side. Reads are authorised against the policy table, using the role on
//! record, but never audited.

use serde::Serialize;
use sqlx::SqlitePool;
use sqlx::pool::PoolConnection;
use sqlx::Sqlite;

use commissary_auth::{authorize, Action, Actor};
use commissary_core::InmateId;
use commissary_inmates::{Fee, Inmate};
use commissary_inventory::{Assignment, Barcode, Item};

use crate::audit::{self, AuditEntry};
use crate::error::{map_sqlx_error, PipelineError};
use crate::records::{self, FeeRow, InmateRow, FEE_COLUMNS, INMATE_COLUMNS};

/// Upper bound on audit entries returned by one read.
pub const MAX_AUDIT_PAGE: u32 = 500;

/// An inmate together with every assignment ever made to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InmateDetail {
    #[serde(flatten)]
    pub inmate: Inmate,
    pub status: commissary_inmates::InmateStatus,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone)]
pub struct Queries {
    pool: SqlitePool,
}

impl Queries {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Authorise against the account on record, then hand back the connection.
    async fn conn(&self, actor: &Actor, action: Action) -> Result<PoolConnection<Sqlite>, PipelineError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;
        let actor = records::resolve_actor(&mut conn, actor).await?;
        authorize(&actor, action)?;
        Ok(conn)
    }

    /// Inmates ordered by id; released inmates only when asked for.
    pub async fn list_inmates(&self, actor: &Actor, include_released: bool) -> Result<Vec<Inmate>, PipelineError> {
        let mut conn = self.conn(actor, Action::ViewRecords).await?;
        let filter = if include_released { "" } else { "WHERE released_at IS NULL" };
        let rows = sqlx::query_as::<_, InmateRow>(&format!(
            "SELECT {INMATE_COLUMNS} FROM inmates {filter} ORDER BY id"
        ))
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("list_inmates", e))?;
        rows.into_iter().map(Inmate::try_from).collect()
    }

    pub async fn inmate(&self, actor: &Actor, id: &InmateId) -> Result<InmateDetail, PipelineError> {
        let mut conn = self.conn(actor, Action::ViewRecords).await?;
        let inmate = records::require_inmate(&mut conn, id).await?;
        let assignments = records::assignments_for_inmate(&mut conn, id).await?;
        Ok(InmateDetail {
            status: inmate.status(),
            inmate,
            assignments,
        })
    }

    pub async fn item(&self, actor: &Actor, barcode: &Barcode) -> Result<Item, PipelineError> {
        let mut conn = self.conn(actor, Action::ViewRecords).await?;
        records::require_item(&mut conn, barcode).await
    }

    /// Fees charged to an inmate, oldest first.
    pub async fn fees_for_inmate(&self, actor: &Actor, id: &InmateId) -> Result<Vec<Fee>, PipelineError> {
        let mut conn = self.conn(actor, Action::ViewRecords).await?;
        records::require_inmate(&mut conn, id).await?;
        let rows = sqlx::query_as::<_, FeeRow>(&format!(
            "SELECT {FEE_COLUMNS} FROM fees WHERE inmate_id = ? ORDER BY rowid"
        ))
        .bind(id.as_str())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("fees_for_inmate", e))?;
        rows.into_iter().map(Fee::try_from).collect()
    }

    /// Most recent audit entries first, at most [`MAX_AUDIT_PAGE`].
    pub async fn audit_log(&self, actor: &Actor, limit: u32) -> Result<Vec<AuditEntry>, PipelineError> {
        let mut conn = self.conn(actor, Action::ViewAuditLog).await?;
        audit::recent(&mut conn, limit.clamp(1, MAX_AUDIT_PAGE)).await
    }
}
