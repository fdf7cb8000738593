use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use commissary_auth::NewUser;
use commissary_infra::writes::CreateUser;

use crate::app::dto::{CreateUserRequest, JsonBody, UserResponse};
use crate::app::errors::{domain_error_to_response, pipeline_error_to_response, ApiResult};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> ApiResult {
    let new_user = NewUser::new(
        body.username,
        body.password,
        body.role,
        body.first_name,
        body.last_name,
        body.email,
    )
    .map_err(domain_error_to_response)?;

    let write = CreateUser::prepare(new_user).await.map_err(pipeline_error_to_response)?;
    let account = services
        .pipeline
        .perform(ctx.actor(), write)
        .await
        .map_err(pipeline_error_to_response)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(account))).into_response())
}
