use async_trait::async_trait;
use sqlx::SqliteConnection;

use commissary_auth::Action;
use commissary_core::{AssignmentId, InmateId};
use commissary_inventory::{Assignment, Barcode, Item, ItemStatus, ReturnOutcome, ReturnRequest};

use crate::error::{map_sqlx_error, PipelineError};
use crate::pipeline::{Applied, DomainWrite, WriteEnv};
use crate::records;

/// Hand an in-stock item to an inmate in custody.
#[derive(Debug, Clone)]
pub struct AssignItem {
    pub inmate_id: InmateId,
    pub barcode: Barcode,
}

#[async_trait]
impl DomainWrite for AssignItem {
    type Output = Assignment;

    fn action(&self) -> Action {
        Action::AssignItem
    }

    async fn apply(self, conn: &mut SqliteConnection, env: &WriteEnv<'_>) -> Result<Applied<Assignment>, PipelineError> {
        let inmate = records::require_inmate(conn, &self.inmate_id).await?;
        inmate.ensure_in_custody()?;

        let mut item = records::require_item(conn, &self.barcode).await?;
        item.assign()?;
        records::save_item_state(conn, &item).await?;

        let assignment = Assignment {
            id: AssignmentId::new(),
            item_id: item.id,
            barcode: item.barcode.clone(),
            inmate_id: inmate.id.clone(),
            assigned_at: env.now,
            returned_at: None,
            outcome: None,
            return_condition: None,
        };
        sqlx::query("INSERT INTO item_assignments (id, item_id, inmate_id, assigned_at) VALUES (?, ?, ?, ?)")
            .bind(*assignment.id.as_uuid())
            .bind(*assignment.item_id.as_uuid())
            .bind(assignment.inmate_id.as_str())
            .bind(assignment.assigned_at)
            .execute(&mut *conn)
            .await
            .map_err(|e| match map_sqlx_error("insert_assignment", e) {
                PipelineError::Conflict(_) => {
                    PipelineError::Conflict(format!("item {} already has an open assignment", item.barcode))
                }
                other => other,
            })?;

        let detail = format!("Item {} assigned to inmate {}", item.barcode, inmate.id);
        Ok(Applied::new(assignment, detail))
    }
}

/// Close an open assignment, returning the item to stock or writing it off as lost.
#[derive(Debug, Clone)]
pub struct ReturnItem {
    pub inmate_id: InmateId,
    pub assignment_id: AssignmentId,
    pub request: ReturnRequest,
}

#[async_trait]
impl DomainWrite for ReturnItem {
    type Output = Assignment;

    fn action(&self) -> Action {
        Action::ReturnItem
    }

    async fn apply(self, conn: &mut SqliteConnection, env: &WriteEnv<'_>) -> Result<Applied<Assignment>, PipelineError> {
        let mut assignment = records::assignment(conn, self.assignment_id)
            .await?
            .filter(|a| a.inmate_id == self.inmate_id)
            .ok_or_else(|| {
                PipelineError::not_found(format!(
                    "assignment {} for inmate {}",
                    self.assignment_id, self.inmate_id
                ))
            })?;
        assignment.close(self.request, env.now)?;

        let mut item = records::require_item(conn, &assignment.barcode).await?;
        match self.request.outcome {
            ReturnOutcome::Returned => {
                let condition = self.request.condition.unwrap_or(item.condition);
                item.return_to_stock(condition)?;
            }
            ReturnOutcome::Lost => item.mark_lost()?,
        }
        records::save_item_state(conn, &item).await?;
        if item.status == ItemStatus::Retired {
            records::retire_barcode(conn, &item.barcode, env.now, "lost while assigned").await?;
        }

        sqlx::query(
            "UPDATE item_assignments SET returned_at = ?, outcome = ?, return_condition = ? WHERE id = ?",
        )
        .bind(assignment.returned_at)
        .bind(assignment.outcome.map(|o| o.as_str()))
        .bind(assignment.return_condition.map(|c| c.as_str()))
        .bind(*assignment.id.as_uuid())
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("close_assignment", e))?;

        let detail = match self.request.outcome {
            ReturnOutcome::Returned => format!(
                "Item {} returned by inmate {} in {} condition",
                item.barcode, assignment.inmate_id, item.condition
            ),
            ReturnOutcome::Lost => format!(
                "Item {} reported lost by inmate {}; barcode retired",
                item.barcode, assignment.inmate_id
            ),
        };
        Ok(Applied::new(assignment, detail))
    }
}

/// Move an assigned item into the laundry. The assignment stays open.
#[derive(Debug, Clone)]
pub struct SendToLaundry {
    pub barcode: Barcode,
}

#[async_trait]
impl DomainWrite for SendToLaundry {
    type Output = Item;

    fn action(&self) -> Action {
        Action::SendToLaundry
    }

    async fn apply(self, conn: &mut SqliteConnection, _env: &WriteEnv<'_>) -> Result<Applied<Item>, PipelineError> {
        let mut item = records::require_item(conn, &self.barcode).await?;
        item.send_to_laundry()?;
        records::save_item_state(conn, &item).await?;

        let detail = format!("Item {} sent to laundry", item.barcode);
        Ok(Applied::new(item, detail))
    }
}

#[derive(Debug, Clone)]
pub struct ReceiveFromLaundry {
    pub barcode: Barcode,
}

#[async_trait]
impl DomainWrite for ReceiveFromLaundry {
    type Output = Item;

    fn action(&self) -> Action {
        Action::ReceiveFromLaundry
    }

    async fn apply(self, conn: &mut SqliteConnection, _env: &WriteEnv<'_>) -> Result<Applied<Item>, PipelineError> {
        let mut item = records::require_item(conn, &self.barcode).await?;
        item.receive_from_laundry()?;
        records::save_item_state(conn, &item).await?;

        let detail = format!("Item {} received from laundry", item.barcode);
        Ok(Applied::new(item, detail))
    }
}
