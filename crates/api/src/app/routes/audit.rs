use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    Json,
};

use crate::app::dto::AuditQuery;
use crate::app::errors::{pipeline_error_to_response, ApiResult};
use crate::app::services::AppServices;
use crate::context::ActorContext;

const DEFAULT_LIMIT: u32 = 100;

pub async fn list_audit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Query(query): Query<AuditQuery>,
) -> ApiResult {
    let entries = services
        .queries
        .audit_log(ctx.actor(), query.limit.unwrap_or(DEFAULT_LIMIT))
        .await
        .map_err(pipeline_error_to_response)?;
    Ok(Json(entries).into_response())
}
