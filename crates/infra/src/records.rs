//! Row types and lookups shared by writes and queries.
//!
//! Every function takes a bare connection so it can run inside a pipeline
//! transaction or against a pooled connection.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

use commissary_auth::{Actor, Role, UserAccount};
use commissary_core::{AssignmentId, FeeId, InmateId, ItemId, Money, UserId};
use commissary_inmates::{Fee, Inmate};
use commissary_inventory::{Assignment, Barcode, Item, ItemCondition, ItemStatus, ReturnOutcome};

use crate::error::{map_sqlx_error, PipelineError};

fn corrupt(what: &str, err: impl core::fmt::Display) -> PipelineError {
    PipelineError::storage(format!("stored {what} is unreadable: {err}"))
}

fn money(what: &str, cents: i64) -> Result<Money, PipelineError> {
    Money::from_cents(cents).map_err(|e| corrupt(what, e))
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn role(&self) -> Result<Role, PipelineError> {
        self.role.parse().map_err(|e| corrupt("user role", e))
    }

    pub fn into_account(self) -> Result<UserAccount, PipelineError> {
        let role = self.role()?;
        Ok(UserAccount {
            id: UserId::from_uuid(self.id),
            username: self.username,
            role,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            created_at: self.created_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, username, password_hash, role, first_name, last_name, email, created_at";

pub(crate) async fn user_by_id(conn: &mut SqliteConnection, id: UserId) -> Result<Option<UserRow>, PipelineError> {
    sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(*id.as_uuid())
        .fetch_optional(conn)
        .await
        .map_err(|e| map_sqlx_error("user_by_id", e))
}

/// Re-read the actor so a deleted account or a changed role takes effect
/// immediately, whatever the token claimed.
pub(crate) async fn resolve_actor(conn: &mut SqliteConnection, claimed: &Actor) -> Result<Actor, PipelineError> {
    let user = user_by_id(conn, claimed.id)
        .await?
        .ok_or_else(|| PipelineError::Unauthenticated(format!("unknown user {}", claimed.id)))?;
    Ok(Actor::new(claimed.id, user.role()?))
}

pub(crate) async fn user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<UserRow>, PipelineError> {
    sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
        .bind(username)
        .fetch_optional(conn)
        .await
        .map_err(|e| map_sqlx_error("user_by_username", e))
}

#[derive(Debug, FromRow)]
pub(crate) struct InmateRow {
    pub id: String,
    pub name: String,
    pub housing_unit: String,
    pub accrued_fees_cents: i64,
    pub notes: String,
    pub released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<InmateRow> for Inmate {
    type Error = PipelineError;

    fn try_from(row: InmateRow) -> Result<Self, Self::Error> {
        Ok(Inmate {
            id: InmateId::parse(&row.id).map_err(|e| corrupt("inmate id", e))?,
            name: row.name,
            housing_unit: row.housing_unit,
            accrued_fees: money("inmate fees", row.accrued_fees_cents)?,
            notes: row.notes,
            released_at: row.released_at,
            created_at: row.created_at,
        })
    }
}

pub(crate) const INMATE_COLUMNS: &str =
    "id, name, housing_unit, accrued_fees_cents, notes, released_at, created_at";

pub(crate) async fn inmate(conn: &mut SqliteConnection, id: &InmateId) -> Result<Option<Inmate>, PipelineError> {
    let row = sqlx::query_as::<_, InmateRow>(&format!("SELECT {INMATE_COLUMNS} FROM inmates WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(conn)
        .await
        .map_err(|e| map_sqlx_error("inmate", e))?;
    row.map(Inmate::try_from).transpose()
}

pub(crate) async fn require_inmate(conn: &mut SqliteConnection, id: &InmateId) -> Result<Inmate, PipelineError> {
    inmate(conn, id)
        .await?
        .ok_or_else(|| PipelineError::not_found(format!("inmate {id}")))
}

pub(crate) async fn save_inmate(conn: &mut SqliteConnection, inmate: &Inmate) -> Result<(), PipelineError> {
    sqlx::query(
        "UPDATE inmates SET name = ?, housing_unit = ?, accrued_fees_cents = ?, notes = ?, released_at = ? WHERE id = ?",
    )
    .bind(&inmate.name)
    .bind(&inmate.housing_unit)
    .bind(inmate.accrued_fees.cents())
    .bind(&inmate.notes)
    .bind(inmate.released_at)
    .bind(inmate.id.as_str())
    .execute(conn)
    .await
    .map_err(|e| map_sqlx_error("save_inmate", e))?;
    Ok(())
}

#[derive(Debug, FromRow)]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub barcode: String,
    pub name: String,
    pub type_code: String,
    pub size_code: String,
    pub vendor: Option<String>,
    pub cost_cents: i64,
    pub condition: String,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = PipelineError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Item {
            id: ItemId::from_uuid(row.id),
            barcode: Barcode::parse(&row.barcode).map_err(|e| corrupt("barcode", e))?,
            name: row.name,
            type_code: row.type_code,
            size_code: row.size_code,
            vendor: row.vendor,
            cost: money("item cost", row.cost_cents)?,
            condition: ItemCondition::parse(&row.condition).map_err(|e| corrupt("item condition", e))?,
            status: ItemStatus::parse(&row.status).map_err(|e| corrupt("item status", e))?,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

const ITEM_COLUMNS: &str =
    "id, barcode, name, type_code, size_code, vendor, cost_cents, condition, status, notes, created_at";

pub(crate) async fn item_by_barcode(
    conn: &mut SqliteConnection,
    barcode: &Barcode,
) -> Result<Option<Item>, PipelineError> {
    let row = sqlx::query_as::<_, ItemRow>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE barcode = ?"))
        .bind(barcode.as_str())
        .fetch_optional(conn)
        .await
        .map_err(|e| map_sqlx_error("item_by_barcode", e))?;
    row.map(Item::try_from).transpose()
}

pub(crate) async fn require_item(conn: &mut SqliteConnection, barcode: &Barcode) -> Result<Item, PipelineError> {
    item_by_barcode(conn, barcode)
        .await?
        .ok_or_else(|| PipelineError::not_found(format!("item {barcode}")))
}

/// Persist the mutable item fields. The barcode never changes.
pub(crate) async fn save_item_state(conn: &mut SqliteConnection, item: &Item) -> Result<(), PipelineError> {
    sqlx::query("UPDATE items SET status = ?, condition = ? WHERE id = ?")
        .bind(item.status.as_str())
        .bind(item.condition.as_str())
        .bind(*item.id.as_uuid())
        .execute(conn)
        .await
        .map_err(|e| map_sqlx_error("save_item_state", e))?;
    Ok(())
}

/// Whether a barcode is held by an item or has been retired.
pub(crate) async fn barcode_taken(conn: &mut SqliteConnection, barcode: &Barcode) -> Result<bool, PipelineError> {
    let (taken,): (i64,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM items WHERE barcode = ?1)
             OR EXISTS (SELECT 1 FROM retired_barcodes WHERE barcode = ?1)",
    )
    .bind(barcode.as_str())
    .fetch_one(conn)
    .await
    .map_err(|e| map_sqlx_error("barcode_taken", e))?;
    Ok(taken != 0)
}

pub(crate) async fn retire_barcode(
    conn: &mut SqliteConnection,
    barcode: &Barcode,
    at: DateTime<Utc>,
    reason: &str,
) -> Result<(), PipelineError> {
    sqlx::query("INSERT INTO retired_barcodes (barcode, retired_at, reason) VALUES (?, ?, ?)")
        .bind(barcode.as_str())
        .bind(at)
        .bind(reason)
        .execute(conn)
        .await
        .map_err(|e| map_sqlx_error("retire_barcode", e))?;
    Ok(())
}

#[derive(Debug, FromRow)]
pub(crate) struct AssignmentRow {
    pub id: Uuid,
    pub item_id: Uuid,
    pub barcode: String,
    pub inmate_id: String,
    pub assigned_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub outcome: Option<String>,
    pub return_condition: Option<String>,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = PipelineError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(Assignment {
            id: AssignmentId::from_uuid(row.id),
            item_id: ItemId::from_uuid(row.item_id),
            barcode: Barcode::parse(&row.barcode).map_err(|e| corrupt("barcode", e))?,
            inmate_id: InmateId::parse(&row.inmate_id).map_err(|e| corrupt("inmate id", e))?,
            assigned_at: row.assigned_at,
            returned_at: row.returned_at,
            outcome: row
                .outcome
                .as_deref()
                .map(ReturnOutcome::parse)
                .transpose()
                .map_err(|e| corrupt("return outcome", e))?,
            return_condition: row
                .return_condition
                .as_deref()
                .map(ItemCondition::parse)
                .transpose()
                .map_err(|e| corrupt("return condition", e))?,
        })
    }
}

pub(crate) const ASSIGNMENT_SELECT: &str = "SELECT a.id, a.item_id, i.barcode, a.inmate_id, a.assigned_at, \
     a.returned_at, a.outcome, a.return_condition \
     FROM item_assignments a JOIN items i ON i.id = a.item_id";

pub(crate) async fn assignment(
    conn: &mut SqliteConnection,
    id: AssignmentId,
) -> Result<Option<Assignment>, PipelineError> {
    let row = sqlx::query_as::<_, AssignmentRow>(&format!("{ASSIGNMENT_SELECT} WHERE a.id = ?"))
        .bind(*id.as_uuid())
        .fetch_optional(conn)
        .await
        .map_err(|e| map_sqlx_error("assignment", e))?;
    row.map(Assignment::try_from).transpose()
}

pub(crate) async fn assignments_for_inmate(
    conn: &mut SqliteConnection,
    inmate_id: &InmateId,
) -> Result<Vec<Assignment>, PipelineError> {
    let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
        "{ASSIGNMENT_SELECT} WHERE a.inmate_id = ? ORDER BY a.assigned_at, a.rowid"
    ))
    .bind(inmate_id.as_str())
    .fetch_all(conn)
    .await
    .map_err(|e| map_sqlx_error("assignments_for_inmate", e))?;
    rows.into_iter().map(Assignment::try_from).collect()
}

pub(crate) async fn open_assignment_count(
    conn: &mut SqliteConnection,
    inmate_id: &InmateId,
) -> Result<usize, PipelineError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM item_assignments WHERE inmate_id = ? AND returned_at IS NULL",
    )
    .bind(inmate_id.as_str())
    .fetch_one(conn)
    .await
    .map_err(|e| map_sqlx_error("open_assignment_count", e))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

#[derive(Debug, FromRow)]
pub(crate) struct FeeRow {
    pub id: Uuid,
    pub name: String,
    pub amount_cents: i64,
    pub inmate_id: Option<String>,
    pub item_barcodes: String,
    pub notes: String,
    pub applied_at: DateTime<Utc>,
}

impl TryFrom<FeeRow> for Fee {
    type Error = PipelineError;

    fn try_from(row: FeeRow) -> Result<Self, Self::Error> {
        let item_barcodes = row
            .item_barcodes
            .split(',')
            .filter(|b| !b.is_empty())
            .map(Barcode::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| corrupt("fee barcodes", e))?;
        Ok(Fee {
            id: FeeId::from_uuid(row.id),
            name: row.name,
            amount: money("fee amount", row.amount_cents)?,
            inmate_id: row
                .inmate_id
                .as_deref()
                .map(InmateId::parse)
                .transpose()
                .map_err(|e| corrupt("fee inmate id", e))?,
            item_barcodes,
            notes: row.notes,
            applied_at: row.applied_at,
        })
    }
}

pub(crate) const FEE_COLUMNS: &str = "id, name, amount_cents, inmate_id, item_barcodes, notes, applied_at";
