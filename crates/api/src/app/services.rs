use std::sync::Arc;

use chrono::Duration;

use commissary_auth::Hs256Jwt;
use commissary_infra::{Database, MutationPipeline, Queries};

/// Everything a handler needs, shared behind an `Arc`.
#[derive(Debug)]
pub struct AppServices {
    pub db: Database,
    pub pipeline: MutationPipeline,
    pub queries: Queries,
    pub jwt: Arc<Hs256Jwt>,
    pub token_ttl: Duration,
}

impl AppServices {
    pub fn new(db: Database, jwt_secret: &str, token_ttl: Duration) -> Self {
        let pool = db.pool().clone();
        Self {
            pipeline: MutationPipeline::new(pool.clone()),
            queries: Queries::new(pool),
            jwt: Arc::new(Hs256Jwt::new(jwt_secret)),
            token_ttl,
            db,
        }
    }
}
