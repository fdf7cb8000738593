use chrono::{DateTime, Utc};
use serde::Serialize;

use commissary_core::{optional_text, required_text, DomainError, DomainResult, FeeId, InmateId, Money};
use commissary_inventory::Barcode;

const NAME_MAX: usize = 100;
const NOTES_MAX: usize = 1000;

/// An applied charge. Never updated or deleted; corrections are new fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fee {
    pub id: FeeId,
    pub name: String,
    pub amount: Money,
    pub inmate_id: Option<InmateId>,
    pub item_barcodes: Vec<Barcode>,
    pub notes: String,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFee {
    pub name: String,
    pub amount: Money,
    pub inmate_id: Option<InmateId>,
    pub item_barcodes: Vec<Barcode>,
    pub notes: String,
}

impl NewFee {
    pub fn new(
        name: Option<String>,
        amount_dollars: Option<f64>,
        inmate_id: Option<String>,
        item_barcodes: Vec<String>,
        notes: Option<String>,
    ) -> DomainResult<Self> {
        let amount = amount_dollars
            .ok_or_else(|| DomainError::validation("amount is required"))
            .and_then(Money::from_dollars)?;
        if amount.is_zero() {
            return Err(DomainError::validation("amount must be greater than zero"));
        }

        let inmate_id = match inmate_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(InmateId::parse(raw)?),
        };

        let mut barcodes: Vec<Barcode> = item_barcodes
            .iter()
            .map(|b| Barcode::parse(b))
            .collect::<DomainResult<_>>()?;
        barcodes.sort();
        barcodes.dedup();

        Ok(Self {
            name: required_text("name", name, NAME_MAX)?,
            amount,
            inmate_id,
            item_barcodes: barcodes,
            notes: optional_text("notes", notes, NOTES_MAX)?.unwrap_or_default(),
        })
    }

    pub fn into_fee(self, id: FeeId, applied_at: DateTime<Utc>) -> Fee {
        Fee {
            id,
            name: self.name,
            amount: self.amount,
            inmate_id: self.inmate_id,
            item_barcodes: self.item_barcodes,
            notes: self.notes,
            applied_at,
        }
    }
}
