//! Barcode allocation against the store.
//!
//! For each candidate from the allocator the union of active and retired
//! barcodes is checked, then the item row is inserted under a savepoint. The
//! check and the insert are not atomic against other writers, so the storage
//! constraints (`items.barcode UNIQUE` plus the retired-barcode trigger) are the
//! authoritative backstop: a violation rolls back the savepoint and counts as a
//! collision, consuming one attempt.

use sqlx::{Connection, SqliteConnection};
use tracing::{debug, warn};

use commissary_inventory::{Barcode, BarcodeAllocator, Item, SerialSource};

use crate::error::{is_barcode_collision, map_sqlx_error, PipelineError};
use crate::records;

/// Outcome of a single guarded insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertOutcome {
    Inserted,
    Collision,
}

/// Allocate a barcode and insert the item built for it.
pub(crate) async fn insert_with_new_barcode(
    conn: &mut SqliteConnection,
    allocator: &BarcodeAllocator,
    serials: &dyn SerialSource,
    mut build: impl FnMut(Barcode) -> Item + Send,
) -> Result<Item, PipelineError> {
    let mut collisions = 0u32;
    for candidate in allocator.candidates(serials) {
        if records::barcode_taken(conn, &candidate).await? {
            collisions += 1;
            debug!(barcode = %candidate, "barcode candidate already taken");
            continue;
        }

        let item = build(candidate);
        match insert_item(conn, &item).await? {
            InsertOutcome::Inserted => {
                if collisions > 0 {
                    debug!(barcode = %item.barcode, collisions, "barcode allocated after collisions");
                }
                return Ok(item);
            }
            InsertOutcome::Collision => {
                collisions += 1;
                warn!(barcode = %item.barcode, "barcode claimed concurrently; retrying");
            }
        }
    }

    warn!(prefix = %allocator.prefix(), attempts = allocator.max_attempts(), "barcode allocation exhausted");
    Err(PipelineError::AllocationExhausted {
        prefix: allocator.prefix(),
        attempts: allocator.max_attempts(),
    })
}

/// Insert one item row inside a savepoint; constraint collisions leave the
/// enclosing transaction intact.
pub(crate) async fn insert_item(conn: &mut SqliteConnection, item: &Item) -> Result<InsertOutcome, PipelineError> {
    let mut savepoint = conn
        .begin()
        .await
        .map_err(|e| map_sqlx_error("savepoint", e))?;

    let inserted = sqlx::query(
        "INSERT INTO items (id, barcode, name, type_code, size_code, vendor, cost_cents, condition, status, notes, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(*item.id.as_uuid())
    .bind(item.barcode.as_str())
    .bind(&item.name)
    .bind(&item.type_code)
    .bind(&item.size_code)
    .bind(item.vendor.as_deref())
    .bind(item.cost.cents())
    .bind(item.condition.as_str())
    .bind(item.status.as_str())
    .bind(&item.notes)
    .bind(item.created_at)
    .execute(&mut *savepoint)
    .await;

    match inserted {
        Ok(_) => {
            savepoint
                .commit()
                .await
                .map_err(|e| map_sqlx_error("release_savepoint", e))?;
            Ok(InsertOutcome::Inserted)
        }
        Err(e) if is_barcode_collision(&e) => {
            savepoint
                .rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback_savepoint", e))?;
            Ok(InsertOutcome::Collision)
        }
        Err(e) => Err(map_sqlx_error("insert_item", e)),
    }
}
