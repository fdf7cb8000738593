//! Declarative role policy: which roles may perform which action.
//!
//! Every state-changing operation and every read surface is named by an
//! [`Action`]. The mapping to roles lives in one table, [`POLICY`], and is
//! consulted once per request by the mutation pipeline (writes) or the API
//! layer (reads).

use serde::Serialize;

use crate::Role;

/// Kind of operation an actor can request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateUser,
    RegisterInmate,
    UpdateInmate,
    ReleaseInmate,
    CreateItem,
    RetireItem,
    AssignItem,
    ReturnItem,
    SendToLaundry,
    ReceiveFromLaundry,
    ApplyFee,
    ViewRecords,
    ViewAuditLog,
}

const EVERYONE: &[Role] = &[Role::Admin, Role::Staff, Role::Trustee];
const STAFF: &[Role] = &[Role::Admin, Role::Staff];
const ADMIN: &[Role] = &[Role::Admin];

/// Action → permitted roles.
pub const POLICY: &[(Action, &[Role])] = &[
    (Action::CreateUser, ADMIN),
    (Action::RegisterInmate, STAFF),
    (Action::UpdateInmate, STAFF),
    (Action::ReleaseInmate, STAFF),
    (Action::CreateItem, ADMIN),
    (Action::RetireItem, ADMIN),
    (Action::AssignItem, STAFF),
    (Action::ReturnItem, STAFF),
    (Action::SendToLaundry, EVERYONE),
    (Action::ReceiveFromLaundry, EVERYONE),
    (Action::ApplyFee, STAFF),
    (Action::ViewRecords, EVERYONE),
    (Action::ViewAuditLog, ADMIN),
];

impl Action {
    /// Roles allowed to perform this action. Unlisted actions admit nobody.
    pub fn required_roles(self) -> &'static [Role] {
        POLICY
            .iter()
            .find(|(action, _)| *action == self)
            .map(|(_, roles)| *roles)
            .unwrap_or(&[])
    }

    pub fn permits(self, role: Role) -> bool {
        self.required_roles().contains(&role)
    }

    /// Label recorded in the audit log for successful mutations.
    pub fn label(self) -> &'static str {
        match self {
            Action::CreateUser => "User Added",
            Action::RegisterInmate => "Inmate Added",
            Action::UpdateInmate => "Inmate Updated",
            Action::ReleaseInmate => "Inmate Released",
            Action::CreateItem => "Item Added",
            Action::RetireItem => "Item Retired",
            Action::AssignItem => "Item Assigned",
            Action::ReturnItem => "Item Returned",
            Action::SendToLaundry => "Item Sent To Laundry",
            Action::ReceiveFromLaundry => "Item Received From Laundry",
            Action::ApplyFee => "Fee Applied",
            Action::ViewRecords => "Records Viewed",
            Action::ViewAuditLog => "Audit Log Viewed",
        }
    }

    pub fn is_mutation(self) -> bool {
        !matches!(self, Action::ViewRecords | Action::ViewAuditLog)
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
