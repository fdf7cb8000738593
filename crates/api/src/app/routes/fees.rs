use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use commissary_infra::writes::ApplyFee;
use commissary_inmates::NewFee;

use crate::app::dto::{ApplyFeeRequest, FeeResponse, JsonBody};
use crate::app::errors::{domain_error_to_response, pipeline_error_to_response, ApiResult};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub async fn apply_fee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    JsonBody(body): JsonBody<ApplyFeeRequest>,
) -> ApiResult {
    let fee = NewFee::new(body.name, body.amount, body.inmate_id, body.item_barcodes, body.notes)
        .map_err(domain_error_to_response)?;

    let fee = services
        .pipeline
        .perform(ctx.actor(), ApplyFee(fee))
        .await
        .map_err(pipeline_error_to_response)?;

    Ok((StatusCode::CREATED, Json(FeeResponse::from(fee))).into_response())
}
