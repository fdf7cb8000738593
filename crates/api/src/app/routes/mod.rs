use axum::{
    routing::{get, post},
    Router,
};

pub mod audit;
pub mod auth;
pub mod common;
pub mod fees;
pub mod inmates;
pub mod items;
pub mod policy;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(auth::whoami))
        .route("/policy", get(policy::list_policy))
        .route("/users", post(users::create_user))
        .route("/fees", post(fees::apply_fee))
        .route("/audit", get(audit::list_audit))
        .nest("/inmates", inmates::router())
        .nest("/items", items::router())
}
