use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use commissary_auth::Actor;
use commissary_infra::accounts;

use crate::app::dto::{JsonBody, LoginRequest, LoginResponse, UserResponse};
use crate::app::errors::{json_error, pipeline_error_to_response, ApiResult};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult {
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "username and password are required",
        ));
    };

    let account = accounts::authenticate(services.db.pool(), &username, &password)
        .await
        .map_err(pipeline_error_to_response)?;

    let issued = services
        .jwt
        .issue(Actor::new(account.id, account.role), Utc::now(), services.token_ttl)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to sign token");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", "could not issue token")
        })?;

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: UserResponse::from(account),
    })
    .into_response())
}

pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> ApiResult {
    let account = accounts::account(services.db.pool(), ctx.actor())
        .await
        .map_err(pipeline_error_to_response)?;
    Ok(Json(UserResponse::from(account)).into_response())
}
