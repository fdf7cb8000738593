use chrono::{DateTime, Utc};
use serde::Serialize;

use commissary_core::{optional_text, required_text, DomainError, DomainResult, ItemId, Money};

use crate::barcode::{Barcode, SizeCode, TypeCode};

/// Lifecycle status of a physical item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ItemStatus {
    #[serde(rename = "In Stock")]
    InStock,
    Assigned,
    #[serde(rename = "In Laundry")]
    InLaundry,
    Retired,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::InStock,
        ItemStatus::Assigned,
        ItemStatus::InLaundry,
        ItemStatus::Retired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::InStock => "In Stock",
            ItemStatus::Assigned => "Assigned",
            ItemStatus::InLaundry => "In Laundry",
            ItemStatus::Retired => "Retired",
        }
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| DomainError::invariant(format!("unknown item status '{raw}'")))
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical condition of an item.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ItemCondition {
    #[default]
    New,
    Used,
    Worn,
    Damaged,
}

impl ItemCondition {
    pub const ALL: [ItemCondition; 4] = [
        ItemCondition::New,
        ItemCondition::Used,
        ItemCondition::Worn,
        ItemCondition::Damaged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::New => "New",
            ItemCondition::Used => "Used",
            ItemCondition::Worn => "Worn",
            ItemCondition::Damaged => "Damaged",
        }
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown condition '{raw}' (expected one of: New, Used, Worn, Damaged)"
                ))
            })
    }
}

impl core::fmt::Display for ItemCondition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical inventory item as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub barcode: Barcode,
    pub name: String,
    pub type_code: String,
    pub size_code: String,
    pub vendor: Option<String>,
    pub cost: Money,
    pub condition: ItemCondition,
    pub status: ItemStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// `In Stock` → `Assigned`.
    pub fn assign(&mut self) -> DomainResult<()> {
        self.transition(ItemStatus::InStock, ItemStatus::Assigned, "assigned")
    }

    /// `Assigned` or `In Laundry` → `In Stock` with the observed condition.
    pub fn return_to_stock(&mut self, condition: ItemCondition) -> DomainResult<()> {
        match self.status {
            ItemStatus::Assigned | ItemStatus::InLaundry => {
                self.status = ItemStatus::InStock;
                self.condition = condition;
                Ok(())
            }
            other => Err(self.bad_state("returned", other)),
        }
    }

    pub fn send_to_laundry(&mut self) -> DomainResult<()> {
        self.transition(ItemStatus::Assigned, ItemStatus::InLaundry, "sent to laundry")
    }

    pub fn receive_from_laundry(&mut self) -> DomainResult<()> {
        self.transition(ItemStatus::InLaundry, ItemStatus::Assigned, "received from laundry")
    }

    /// Write off an item that is not on loan to an inmate.
    pub fn retire(&mut self) -> DomainResult<()> {
        match self.status {
            ItemStatus::InStock => {
                self.status = ItemStatus::Retired;
                Ok(())
            }
            other => Err(self.bad_state("retired", other)),
        }
    }

    /// Retire an item reported lost while assigned (or in laundry).
    pub fn mark_lost(&mut self) -> DomainResult<()> {
        match self.status {
            ItemStatus::Assigned | ItemStatus::InLaundry => {
                self.status = ItemStatus::Retired;
                Ok(())
            }
            other => Err(self.bad_state("marked lost", other)),
        }
    }

    fn transition(&mut self, from: ItemStatus, to: ItemStatus, verb: &str) -> DomainResult<()> {
        if self.status != from {
            return Err(self.bad_state(verb, self.status));
        }
        self.status = to;
        Ok(())
    }

    fn bad_state(&self, verb: &str, status: ItemStatus) -> DomainError {
        DomainError::conflict(format!("item {} cannot be {verb} while {status}", self.barcode))
    }
}

const NAME_MAX: usize = 100;
const VENDOR_MAX: usize = 100;
const NOTES_MAX: usize = 1000;

/// Validated input for creating an item. The barcode is allocated at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub type_code: TypeCode,
    pub size_code: SizeCode,
    pub vendor: Option<String>,
    pub cost: Money,
    pub condition: ItemCondition,
    pub notes: String,
}

impl NewItem {
    pub fn new(
        name: Option<String>,
        type_code: Option<String>,
        size_code: Option<String>,
        vendor: Option<String>,
        cost_dollars: Option<f64>,
        condition: Option<String>,
        notes: Option<String>,
    ) -> DomainResult<Self> {
        let type_code = TypeCode::parse(type_code.as_deref().unwrap_or_default())?;
        let size_code = SizeCode::parse(size_code.as_deref().unwrap_or_default())?;
        let cost = match cost_dollars {
            Some(d) => Money::from_dollars(d)?,
            None => Money::ZERO,
        };
        let condition = match condition.as_deref().map(str::trim) {
            None | Some("") => ItemCondition::default(),
            Some(raw) => ItemCondition::parse(raw)?,
        };

        Ok(Self {
            name: required_text("name", name, NAME_MAX)?,
            type_code,
            size_code,
            vendor: optional_text("vendor", vendor, VENDOR_MAX)?,
            cost,
            condition,
            notes: optional_text("notes", notes, NOTES_MAX)?.unwrap_or_default(),
        })
    }

    /// Materialise the stored item once a barcode has been allocated.
    pub fn into_item(self, id: ItemId, barcode: Barcode, created_at: DateTime<Utc>) -> Item {
        Item {
            id,
            barcode,
            name: self.name,
            type_code: self.type_code.as_str().to_string(),
            size_code: self.size_code.as_str().to_string(),
            vendor: self.vendor,
            cost: self.cost,
            condition: self.condition,
            status: ItemStatus::InStock,
            notes: self.notes,
            created_at,
        }
    }
}
