use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use commissary_core::optional_text;
use commissary_infra::writes::{CreateItem, ReceiveFromLaundry, RetireItem, SendToLaundry};
use commissary_inventory::NewItem;

use crate::app::dto::{CreateItemRequest, ItemResponse, JsonBody, OptionalJsonBody, RetireItemRequest};
use crate::app::errors::{domain_error_to_response, pipeline_error_to_response, ApiResult};
use crate::app::routes::common::parse_barcode;
use crate::app::services::AppServices;
use crate::context::ActorContext;

const DEFAULT_RETIRE_REASON: &str = "retired";

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_item))
        .route("/:barcode", get(get_item))
        .route("/:barcode/retire", post(retire_item))
        .route("/:barcode/laundry", post(send_to_laundry))
        .route("/:barcode/laundry/return", post(receive_from_laundry))
}

async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    JsonBody(body): JsonBody<CreateItemRequest>,
) -> ApiResult {
    let new_item = NewItem::new(
        body.name,
        body.type_code,
        body.size_code,
        body.vendor,
        body.cost,
        body.condition,
        body.notes,
    )
    .map_err(domain_error_to_response)?;

    let item = services
        .pipeline
        .perform(ctx.actor(), CreateItem(new_item))
        .await
        .map_err(pipeline_error_to_response)?;

    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))).into_response())
}

async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(barcode): Path<String>,
) -> ApiResult {
    let barcode = parse_barcode(&barcode)?;
    let item = services
        .queries
        .item(ctx.actor(), &barcode)
        .await
        .map_err(pipeline_error_to_response)?;
    Ok(Json(ItemResponse::from(item)).into_response())
}

async fn retire_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(barcode): Path<String>,
    OptionalJsonBody(body): OptionalJsonBody<RetireItemRequest>,
) -> ApiResult {
    let barcode = parse_barcode(&barcode)?;
    let reason = optional_text("reason", body.reason, 500)
        .map_err(domain_error_to_response)?
        .unwrap_or_else(|| DEFAULT_RETIRE_REASON.to_string());

    let item = services
        .pipeline
        .perform(ctx.actor(), RetireItem { barcode, reason })
        .await
        .map_err(pipeline_error_to_response)?;
    Ok(Json(ItemResponse::from(item)).into_response())
}

async fn send_to_laundry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(barcode): Path<String>,
) -> ApiResult {
    let barcode = parse_barcode(&barcode)?;
    let item = services
        .pipeline
        .perform(ctx.actor(), SendToLaundry { barcode })
        .await
        .map_err(pipeline_error_to_response)?;
    Ok(Json(ItemResponse::from(item)).into_response())
}

async fn receive_from_laundry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(barcode): Path<String>,
) -> ApiResult {
    let barcode = parse_barcode(&barcode)?;
    let item = services
        .pipeline
        .perform(ctx.actor(), ReceiveFromLaundry { barcode })
        .await
        .map_err(pipeline_error_to_response)?;
    Ok(Json(ItemResponse::from(item)).into_response())
}
