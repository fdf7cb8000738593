use axum::{extract::Extension, response::IntoResponse, Json};
use serde::Serialize;

use commissary_auth::{authorize, Action, POLICY};

use crate::app::errors::{pipeline_error_to_response, ApiResult};
use crate::context::ActorContext;

#[derive(Debug, Serialize)]
pub struct PolicyEntry {
    pub action: Action,
    pub label: &'static str,
    pub roles: Vec<&'static str>,
    pub audited: bool,
}

pub async fn list_policy(Extension(ctx): Extension<ActorContext>) -> ApiResult {
    authorize(ctx.actor(), Action::ViewRecords).map_err(|e| pipeline_error_to_response(e.into()))?;

    let entries: Vec<PolicyEntry> = POLICY
        .iter()
        .map(|(action, roles)| PolicyEntry {
            action: *action,
            label: action.label(),
            roles: roles.iter().map(|r| r.as_str()).collect(),
            audited: action.is_mutation(),
        })
        .collect();
    Ok(Json(entries).into_response())
}
