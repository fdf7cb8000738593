//! `commissary-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod money;

pub use error::{optional_text, required_text, DomainError, DomainResult};
pub use id::{AssignmentId, AuditEntryId, FeeId, InmateId, ItemId, UserId};
pub use money::Money;
