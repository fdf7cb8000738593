//! Request/response DTOs and JSON mapping helpers.
//!
//! Request fields are optional at the JSON layer so that a missing field is
//! reported by domain validation (400) rather than as a decoding failure.

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use commissary_auth::UserAccount;
use commissary_core::{AssignmentId, FeeId, InmateId, ItemId, UserId};
use commissary_infra::InmateDetail;
use commissary_inmates::{Fee, Inmate, InmateStatus};
use commissary_inventory::{Assignment, Item};

use crate::app::errors;

/// `Json<T>` whose rejections use the API error body and status 400.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_json",
                rejection.body_text(),
            )),
        }
    }
}

/// Like [`JsonBody`], but an empty body yields `T::default()`.
pub struct OptionalJsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_json", e.to_string()))
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInmateRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub housing_unit: Option<String>,
    pub fees: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInmateRequest {
    pub name: Option<String>,
    pub housing_unit: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListInmatesQuery {
    #[serde(default)]
    pub include_released: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub type_code: Option<String>,
    pub size_code: Option<String>,
    pub vendor: Option<String>,
    pub cost: Option<f64>,
    pub condition: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RetireItemRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignItemRequest {
    pub barcode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnItemRequest {
    pub outcome: Option<String>,
    pub condition: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyFeeRequest {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub inmate_id: Option<String>,
    #[serde(default)]
    pub item_barcodes: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<u32>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for UserResponse {
    fn from(u: UserAccount) -> Self {
        Self {
            id: u.id,
            username: u.username,
            role: u.role.as_str().to_string(),
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InmateResponse {
    pub id: InmateId,
    pub name: String,
    pub housing_unit: String,
    pub fees: f64,
    pub notes: String,
    pub status: InmateStatus,
    pub released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<AssignmentResponse>>,
}

impl From<Inmate> for InmateResponse {
    fn from(i: Inmate) -> Self {
        Self {
            status: i.status(),
            id: i.id,
            name: i.name,
            housing_unit: i.housing_unit,
            fees: i.accrued_fees.as_dollars(),
            notes: i.notes,
            released_at: i.released_at,
            created_at: i.created_at,
            assignments: None,
        }
    }
}

impl From<InmateDetail> for InmateResponse {
    fn from(d: InmateDetail) -> Self {
        let mut response = InmateResponse::from(d.inmate);
        response.assignments = Some(d.assignments.into_iter().map(AssignmentResponse::from).collect());
        response
    }
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: ItemId,
    pub barcode: String,
    pub name: String,
    pub type_code: String,
    pub size_code: String,
    pub vendor: Option<String>,
    pub cost: f64,
    pub condition: String,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl From<Item> for ItemResponse {
    fn from(i: Item) -> Self {
        Self {
            id: i.id,
            barcode: i.barcode.into(),
            name: i.name,
            type_code: i.type_code,
            size_code: i.size_code,
            vendor: i.vendor,
            cost: i.cost.as_dollars(),
            condition: i.condition.as_str().to_string(),
            status: i.status.as_str().to_string(),
            notes: i.notes,
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub id: AssignmentId,
    pub item_id: ItemId,
    pub barcode: String,
    pub inmate_id: InmateId,
    pub assigned_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub outcome: Option<String>,
    pub return_condition: Option<String>,
}

impl From<Assignment> for AssignmentResponse {
    fn from(a: Assignment) -> Self {
        Self {
            id: a.id,
            item_id: a.item_id,
            barcode: a.barcode.into(),
            inmate_id: a.inmate_id,
            assigned_at: a.assigned_at,
            returned_at: a.returned_at,
            outcome: a.outcome.map(|o| o.as_str().to_string()),
            return_condition: a.return_condition.map(|c| c.as_str().to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeeResponse {
    pub id: FeeId,
    pub name: String,
    pub amount: f64,
    pub inmate_id: Option<InmateId>,
    pub item_barcodes: Vec<String>,
    pub notes: String,
    pub applied_at: DateTime<Utc>,
}

impl From<Fee> for FeeResponse {
    fn from(f: Fee) -> Self {
        Self {
            id: f.id,
            name: f.name,
            amount: f.amount.as_dollars(),
            inmate_id: f.inmate_id,
            item_barcodes: f.item_barcodes.into_iter().map(String::from).collect(),
            notes: f.notes,
            applied_at: f.applied_at,
        }
    }
}
