use async_trait::async_trait;
use sqlx::SqliteConnection;

use commissary_auth::Action;
use commissary_core::FeeId;
use commissary_inmates::{Fee, NewFee};

use crate::error::{map_sqlx_error, PipelineError};
use crate::pipeline::{Applied, DomainWrite, WriteEnv};
use crate::records;

/// Apply a fee, charging the inmate's account when one is named.
#[derive(Debug, Clone)]
pub struct ApplyFee(pub NewFee);

#[async_trait]
impl DomainWrite for ApplyFee {
    type Output = Fee;

    fn action(&self) -> Action {
        Action::ApplyFee
    }

    async fn apply(self, conn: &mut SqliteConnection, env: &WriteEnv<'_>) -> Result<Applied<Fee>, PipelineError> {
        let fee = self.0.into_fee(FeeId::new(), env.now);

        for barcode in &fee.item_barcodes {
            records::require_item(conn, barcode).await?;
        }

        if let Some(inmate_id) = &fee.inmate_id {
            let mut inmate = records::require_inmate(conn, inmate_id).await?;
            inmate.charge(fee.amount)?;
            records::save_inmate(conn, &inmate).await?;
        }

        let barcodes = fee
            .item_barcodes
            .iter()
            .map(|b| b.as_str())
            .collect::<Vec<_>>()
            .join(",");
        sqlx::query(
            "INSERT INTO fees (id, name, amount_cents, inmate_id, item_barcodes, notes, applied_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(*fee.id.as_uuid())
        .bind(&fee.name)
        .bind(fee.amount.cents())
        .bind(fee.inmate_id.as_ref().map(|id| id.as_str()))
        .bind(&barcodes)
        .bind(&fee.notes)
        .bind(fee.applied_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("insert_fee", e))?;

        let detail = match &fee.inmate_id {
            Some(inmate_id) => format!("Fee '{}' of {} applied to inmate {}", fee.name, fee.amount, inmate_id),
            None => format!("Fee '{}' of {} applied", fee.name, fee.amount),
        };
        Ok(Applied::new(fee, detail))
    }
}
