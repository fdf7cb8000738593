use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use commissary_infra::writes::{AssignItem, RegisterInmate, ReleaseInmate, ReturnItem, UpdateInmate};
use commissary_inmates::{InmateUpdate, NewInmate};
use commissary_inventory::ReturnRequest;

use crate::app::dto::{
    AssignItemRequest, AssignmentResponse, CreateInmateRequest, FeeResponse, InmateResponse, JsonBody,
    ListInmatesQuery, ReturnItemRequest, UpdateInmateRequest,
};
use crate::app::errors::{domain_error_to_response, pipeline_error_to_response, ApiResult};
use crate::app::routes::common::{parse_assignment_id, parse_barcode, parse_inmate_id};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_inmates).post(register_inmate))
        .route("/:id", get(get_inmate).patch(update_inmate))
        .route("/:id/release", post(release_inmate))
        .route("/:id/items", post(assign_item))
        .route("/:id/items/:assignment_id/return", post(return_item))
        .route("/:id/fees", get(list_fees))
}

async fn list_inmates(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(query): Query<ListInmatesQuery>,
) -> ApiResult {
    let inmates = services
        .queries
        .list_inmates(ctx.actor(), query.include_released)
        .await
        .map_err(pipeline_error_to_response)?;
    let body: Vec<InmateResponse> = inmates.into_iter().map(InmateResponse::from).collect();
    Ok(Json(body).into_response())
}

async fn register_inmate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    JsonBody(body): JsonBody<CreateInmateRequest>,
) -> ApiResult {
    let new_inmate = NewInmate::new(body.id, body.name, body.housing_unit, body.fees, body.notes)
        .map_err(domain_error_to_response)?;

    let inmate = services
        .pipeline
        .perform(ctx.actor(), RegisterInmate(new_inmate))
        .await
        .map_err(pipeline_error_to_response)?;

    Ok((StatusCode::CREATED, Json(InmateResponse::from(inmate))).into_response())
}

async fn get_inmate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_inmate_id(&id)?;
    let detail = services
        .queries
        .inmate(ctx.actor(), &id)
        .await
        .map_err(pipeline_error_to_response)?;
    Ok(Json(InmateResponse::from(detail)).into_response())
}

async fn update_inmate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateInmateRequest>,
) -> ApiResult {
    let id = parse_inmate_id(&id)?;
    let update = InmateUpdate::new(body.name, body.housing_unit, body.notes).map_err(domain_error_to_response)?;

    let inmate = services
        .pipeline
        .perform(ctx.actor(), UpdateInmate { id, update })
        .await
        .map_err(pipeline_error_to_response)?;
    Ok(Json(InmateResponse::from(inmate)).into_response())
}

async fn release_inmate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_inmate_id(&id)?;
    let inmate = services
        .pipeline
        .perform(ctx.actor(), ReleaseInmate { id })
        .await
        .map_err(pipeline_error_to_response)?;
    Ok(Json(InmateResponse::from(inmate)).into_response())
}

async fn assign_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<AssignItemRequest>,
) -> ApiResult {
    let inmate_id = parse_inmate_id(&id)?;
    let barcode = parse_barcode(body.barcode.as_deref().unwrap_or_default())?;

    let assignment = services
        .pipeline
        .perform(ctx.actor(), AssignItem { inmate_id, barcode })
        .await
        .map_err(pipeline_error_to_response)?;
    Ok((StatusCode::CREATED, Json(AssignmentResponse::from(assignment))).into_response())
}

async fn return_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path((id, assignment_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<ReturnItemRequest>,
) -> ApiResult {
    let inmate_id = parse_inmate_id(&id)?;
    let assignment_id = parse_assignment_id(&assignment_id)?;
    let request = ReturnRequest::new(body.outcome, body.condition).map_err(domain_error_to_response)?;

    let assignment = services
        .pipeline
        .perform(ctx.actor(), ReturnItem { inmate_id, assignment_id, request })
        .await
        .map_err(pipeline_error_to_response)?;
    Ok(Json(AssignmentResponse::from(assignment)).into_response())
}

async fn list_fees(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_inmate_id(&id)?;
    let fees = services
        .queries
        .fees_for_inmate(ctx.actor(), &id)
        .await
        .map_err(pipeline_error_to_response)?;
    let body: Vec<FeeResponse> = fees.into_iter().map(FeeResponse::from).collect();
    Ok(Json(body).into_response())
}
