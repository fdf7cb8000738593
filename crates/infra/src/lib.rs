//! Infrastructure layer: SQLite storage, the mutation pipeline, and the
//! barcode allocation loop.
//!
//! Domain crates stay free of IO; this crate owns every transaction.

pub mod accounts;
mod allocation;
pub mod audit;
pub mod bootstrap;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod queries;
mod records;
pub mod writes;


pub use audit::AuditEntry;
pub use db::Database;
pub use error::PipelineError;
pub use pipeline::{Applied, DomainWrite, MutationPipeline, WriteEnv};
pub use queries::{InmateDetail, Queries};
