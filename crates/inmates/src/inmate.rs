use chrono::{DateTime, Utc};
use serde::Serialize;

use commissary_core::{optional_text, required_text, DomainError, DomainResult, InmateId, Money};

pub const DEFAULT_HOUSING_UNIT: &str = "Unknown";

const NAME_MAX: usize = 100;
const HOUSING_MAX: usize = 50;
const NOTES_MAX: usize = 2000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum InmateStatus {
    #[serde(rename = "In Custody")]
    InCustody,
    Released,
}

/// An inmate record. Released inmates are kept for history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inmate {
    pub id: InmateId,
    pub name: String,
    pub housing_unit: String,
    pub accrued_fees: Money,
    pub notes: String,
    pub released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Inmate {
    pub fn status(&self) -> InmateStatus {
        if self.released_at.is_some() {
            InmateStatus::Released
        } else {
            InmateStatus::InCustody
        }
    }

    pub fn ensure_in_custody(&self) -> DomainResult<()> {
        match self.status() {
            InmateStatus::InCustody => Ok(()),
            InmateStatus::Released => Err(DomainError::conflict(format!(
                "inmate {} has been released",
                self.id
            ))),
        }
    }

    /// Release an inmate who holds no open assignments.
    pub fn release(&mut self, open_assignments: usize, at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_in_custody()?;
        if open_assignments > 0 {
            return Err(DomainError::conflict(format!(
                "inmate {} still has {open_assignments} assigned item(s)",
                self.id
            )));
        }
        self.released_at = Some(at);
        self.notes = append_note(&self.notes, &format!("Released {}", at.format("%Y-%m-%d %H:%M UTC")));
        Ok(())
    }

    pub fn charge(&mut self, amount: Money) -> DomainResult<()> {
        self.accrued_fees = self.accrued_fees.checked_add(amount)?;
        Ok(())
    }

    pub fn apply_update(&mut self, update: InmateUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(housing_unit) = update.housing_unit {
            self.housing_unit = housing_unit;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }
}

fn append_note(existing: &str, line: &str) -> String {
    if existing.is_empty() {
        line.to_string()
    } else {
        format!("{existing}\n{line}")
    }
}

/// Validated input for registering an inmate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInmate {
    pub id: InmateId,
    pub name: String,
    pub housing_unit: String,
    pub accrued_fees: Money,
    pub notes: String,
}

impl NewInmate {
    pub fn new(
        id: Option<String>,
        name: Option<String>,
        housing_unit: Option<String>,
        fees_dollars: Option<f64>,
        notes: Option<String>,
    ) -> DomainResult<Self> {
        let id = InmateId::parse(id.as_deref().unwrap_or_default())?;
        let accrued_fees = match fees_dollars {
            Some(d) => Money::from_dollars(d)?,
            None => Money::ZERO,
        };
        Ok(Self {
            id,
            name: required_text("name", name, NAME_MAX)?,
            housing_unit: optional_text("housing_unit", housing_unit, HOUSING_MAX)?
                .unwrap_or_else(|| DEFAULT_HOUSING_UNIT.to_string()),
            accrued_fees,
            notes: optional_text("notes", notes, NOTES_MAX)?.unwrap_or_default(),
        })
    }

    pub fn into_inmate(self, created_at: DateTime<Utc>) -> Inmate {
        Inmate {
            id: self.id,
            name: self.name,
            housing_unit: self.housing_unit,
            accrued_fees: self.accrued_fees,
            notes: self.notes,
            released_at: None,
            created_at,
        }
    }
}

/// Partial update of an inmate's descriptive fields. Fees change only via applied fees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InmateUpdate {
    pub name: Option<String>,
    pub housing_unit: Option<String>,
    pub notes: Option<String>,
}

impl InmateUpdate {
    pub fn new(
        name: Option<String>,
        housing_unit: Option<String>,
        notes: Option<String>,
    ) -> DomainResult<Self> {
        let update = Self {
            name: name.map(|n| required_text("name", Some(n), NAME_MAX)).transpose()?,
            housing_unit: housing_unit
                .map(|h| required_text("housing_unit", Some(h), HOUSING_MAX))
                .transpose()?,
            // Notes may be cleared.
            notes: match notes {
                None => None,
                Some(n) => Some(optional_text("notes", Some(n), NOTES_MAX)?.unwrap_or_default()),
            },
        };
        if update.is_empty() {
            return Err(DomainError::validation("no fields to update"));
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.housing_unit.is_none() && self.notes.is_none()
    }

    /// Names of the fields being changed, for the audit trail.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.housing_unit.is_some() {
            fields.push("housing_unit");
        }
        if self.notes.is_some() {
            fields.push("notes");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn jane() -> Inmate {
        NewInmate::new(s("INM001"), s("Jane Doe"), None, None, None)
            .unwrap()
            .into_inmate(Utc::now())
    }

    #[test]
    fn registration_defaults() {
        let inmate = jane();
        assert_eq!(inmate.housing_unit, DEFAULT_HOUSING_UNIT);
        assert!(inmate.accrued_fees.is_zero());
        assert_eq!(inmate.notes, "");
        assert_eq!(inmate.status(), InmateStatus::InCustody);
    }

    #[test]
    fn registration_requires_id_and_name() {
        assert!(NewInmate::new(None, s("Jane"), None, None, None).is_err());
        assert!(NewInmate::new(s("INM001"), s("  "), None, None, None).is_err());
        assert!(NewInmate::new(s("INM001"), s("Jane"), None, Some(-3.0), None).is_err());
    }

    #[test]
    fn release_blocked_by_open_assignments() {
        let mut inmate = jane();
        assert!(matches!(inmate.release(2, Utc::now()), Err(DomainError::Conflict(_))));
        inmate.release(0, Utc::now()).unwrap();
        assert_eq!(inmate.status(), InmateStatus::Released);
        assert!(inmate.notes.starts_with("Released "));
        assert!(inmate.release(0, Utc::now()).is_err());
    }

    #[test]
    fn update_applies_only_given_fields() {
        let mut inmate = jane();
        let update = InmateUpdate::new(None, s("B-12"), s("")).unwrap();
        assert_eq!(update.changed_fields(), vec!["housing_unit", "notes"]);
        inmate.apply_update(update);
        assert_eq!(inmate.name, "Jane Doe");
        assert_eq!(inmate.housing_unit, "B-12");
        assert!(InmateUpdate::new(None, None, None).is_err());
    }

    #[test]
    fn charges_accumulate() {
        let mut inmate = jane();
        inmate.charge(Money::from_cents(250).unwrap()).unwrap();
        inmate.charge(Money::from_cents(100).unwrap()).unwrap();
        assert_eq!(inmate.accrued_fees.cents(), 350);
    }
}
