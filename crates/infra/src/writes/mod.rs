//! Domain writes executed by the mutation pipeline.
//!
//! Each type validates nothing itself: inputs arrive as already-validated
//! domain values, and each `apply` only performs the state checks that need
//! the store (existence, current status) before touching rows.

pub mod assignments;
pub mod fees;
pub mod inmates;
pub mod items;
pub mod users;

pub use assignments::{AssignItem, ReceiveFromLaundry, ReturnItem, SendToLaundry};
pub use fees::ApplyFee;
pub use inmates::{RegisterInmate, ReleaseInmate, UpdateInmate};
pub use items::{CreateItem, RetireItem};
pub use users::CreateUser;
