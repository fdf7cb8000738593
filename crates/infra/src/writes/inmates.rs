use async_trait::async_trait;
use sqlx::SqliteConnection;

use commissary_auth::Action;
use commissary_core::InmateId;
use commissary_inmates::{Inmate, InmateUpdate, NewInmate};

use crate::error::{map_sqlx_error, PipelineError};
use crate::pipeline::{Applied, DomainWrite, WriteEnv};
use crate::records;

/// Register a new inmate under an externally supplied id.
#[derive(Debug, Clone)]
pub struct RegisterInmate(pub NewInmate);

#[async_trait]
impl DomainWrite for RegisterInmate {
    type Output = Inmate;

    fn action(&self) -> Action {
        Action::RegisterInmate
    }

    async fn apply(self, conn: &mut SqliteConnection, env: &WriteEnv<'_>) -> Result<Applied<Inmate>, PipelineError> {
        let inmate = self.0.into_inmate(env.now);
        sqlx::query(
            "INSERT INTO inmates (id, name, housing_unit, accrued_fees_cents, notes, released_at, created_at)
             VALUES (?, ?, ?, ?, ?, NULL, ?)",
        )
        .bind(inmate.id.as_str())
        .bind(&inmate.name)
        .bind(&inmate.housing_unit)
        .bind(inmate.accrued_fees.cents())
        .bind(&inmate.notes)
        .bind(inmate.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| match map_sqlx_error("insert_inmate", e) {
            PipelineError::Conflict(_) => PipelineError::Conflict(format!("inmate {} already exists", inmate.id)),
            other => other,
        })?;

        let detail = format!("Inmate {} added", inmate.id);
        Ok(Applied::new(inmate, detail))
    }
}

#[derive(Debug, Clone)]
pub struct UpdateInmate {
    pub id: InmateId,
    pub update: InmateUpdate,
}

#[async_trait]
impl DomainWrite for UpdateInmate {
    type Output = Inmate;

    fn action(&self) -> Action {
        Action::UpdateInmate
    }

    async fn apply(self, conn: &mut SqliteConnection, _env: &WriteEnv<'_>) -> Result<Applied<Inmate>, PipelineError> {
        let mut inmate = records::require_inmate(conn, &self.id).await?;
        inmate.ensure_in_custody()?;

        let fields = self.update.changed_fields().join(", ");
        inmate.apply_update(self.update);
        records::save_inmate(conn, &inmate).await?;

        let detail = format!("Inmate {} updated ({fields})", inmate.id);
        Ok(Applied::new(inmate, detail))
    }
}

/// Release an inmate with no items still assigned. The record is kept.
#[derive(Debug, Clone)]
pub struct ReleaseInmate {
    pub id: InmateId,
}

#[async_trait]
impl DomainWrite for ReleaseInmate {
    type Output = Inmate;

    fn action(&self) -> Action {
        Action::ReleaseInmate
    }

    async fn apply(self, conn: &mut SqliteConnection, env: &WriteEnv<'_>) -> Result<Applied<Inmate>, PipelineError> {
        let mut inmate = records::require_inmate(conn, &self.id).await?;
        let open = records::open_assignment_count(conn, &self.id).await?;
        inmate.release(open, env.now)?;
        records::save_inmate(conn, &inmate).await?;

        let detail = format!("Inmate {} released", inmate.id);
        Ok(Applied::new(inmate, detail))
    }
}
