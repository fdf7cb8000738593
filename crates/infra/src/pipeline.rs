//! Audit-gated mutation pipeline.
//!
//! Every state-changing operation runs through [`MutationPipeline::perform`]:
//!
//! ```text
//! begin transaction
//!   ↓
//! 1. Resolve the actor against `users` (unknown → Unauthenticated)
//!   ↓
//! 2. Consult the policy table (role not admitted → PermissionDenied)
//!   ↓
//! 3. Apply the domain write
//!   ↓
//! 4. Append exactly one audit entry
//!   ↓
//! commit
//! ```
//!
//! Any failure drops the transaction, which rolls it back: a rejected or failed
//! mutation leaves neither a domain row nor an audit entry behind. A future
//! dropped mid-flight (client disconnect) rolls back the same way.
//!
//! ## Isolation
//!
//! Write transactions open with `BEGIN IMMEDIATE`, taking SQLite's write lock
//! up front so a transaction never has to upgrade a read lock mid-flight.
//! Concurrent writers wait in the storage engine (`busy_timeout`), not in this
//! process; readers are unaffected under WAL. Barcode uniqueness rests on the
//! storage constraints.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{field, info, instrument, Span};

use commissary_auth::{authorize, Action, Actor};
use commissary_inventory::{SerialSource, ThreadRngSerials};

use crate::audit;
use crate::error::{map_sqlx_error, PipelineError};
use crate::records;

/// Result of a domain write: what the caller gets back, and the audit detail line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<T> {
    pub output: T,
    pub detail: String,
}

impl<T> Applied<T> {
    pub fn new(output: T, detail: impl Into<String>) -> Self {
        Self {
            output,
            detail: detail.into(),
        }
    }
}

/// Ambient values available to a domain write.
pub struct WriteEnv<'a> {
    /// The authorised actor, with the role currently on record.
    pub actor: &'a Actor,
    /// Transaction timestamp, shared by the domain rows and the audit entry.
    pub now: DateTime<Utc>,
    pub serials: &'a dyn SerialSource,
}

/// A state change that must be authorised and audited.
#[async_trait]
pub trait DomainWrite: Send + Sized {
    type Output: Send;

    fn action(&self) -> Action;

    async fn apply(
        self,
        conn: &mut SqliteConnection,
        env: &WriteEnv<'_>,
    ) -> Result<Applied<Self::Output>, PipelineError>;
}

#[derive(Clone)]
pub struct MutationPipeline {
    pool: SqlitePool,
    serials: Arc<dyn SerialSource>,
}

impl core::fmt::Debug for MutationPipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MutationPipeline").finish_non_exhaustive()
    }
}

impl MutationPipeline {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_serials(pool, Arc::new(ThreadRngSerials))
    }

    /// Use a specific serial source for barcode allocation.
    pub fn with_serials(pool: SqlitePool, serials: Arc<dyn SerialSource>) -> Self {
        Self { pool, serials }
    }

    #[instrument(
        skip(self, write),
        fields(actor = %actor.id, action = field::Empty),
        err
    )]
    pub async fn perform<W: DomainWrite>(&self, actor: &Actor, write: W) -> Result<W::Output, PipelineError> {
        let action = write.action();
        Span::current().record("action", field::display(action));

        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let actor = records::resolve_actor(&mut tx, actor).await?;
        authorize(&actor, action)?;

        let env = WriteEnv {
            actor: &actor,
            now: Utc::now(),
            serials: self.serials.as_ref(),
        };
        let applied = write.apply(&mut tx, &env).await?;
        audit::append(&mut tx, actor.id, action.label(), env.now, &applied.detail).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        info!(action = action.label(), detail = %applied.detail, "mutation committed");
        Ok(applied.output)
    }
}
