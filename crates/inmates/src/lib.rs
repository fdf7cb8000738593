//! Inmate records and the fees charged against them.
//!
//! Pure domain logic: validation and state rules only. Persistence lives in
//! `commissary-infra`.

pub mod fee;
pub mod inmate;

pub use fee::{Fee, NewFee};
pub use inmate::{Inmate, InmateStatus, InmateUpdate, NewInmate};
