use chrono::{DateTime, Utc};
use serde::Serialize;

use commissary_core::{AssignmentId, DomainError, DomainResult, InmateId, ItemId};

use crate::barcode::Barcode;
use crate::item::ItemCondition;

/// How an assignment was closed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ReturnOutcome {
    Returned,
    Lost,
}

impl ReturnOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnOutcome::Returned => "Returned",
            ReturnOutcome::Lost => "Lost",
        }
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        [ReturnOutcome::Returned, ReturnOutcome::Lost]
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| {
                DomainError::validation(format!("unknown outcome '{raw}' (expected Returned or Lost)"))
            })
    }
}

/// An item on loan to an inmate. Open while `returned_at` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub item_id: ItemId,
    pub barcode: Barcode,
    pub inmate_id: InmateId,
    pub assigned_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub outcome: Option<ReturnOutcome>,
    pub return_condition: Option<ItemCondition>,
}

impl Assignment {
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }

    pub fn close(&mut self, request: ReturnRequest, at: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_open() {
            return Err(DomainError::conflict(format!(
                "assignment {} is already closed",
                self.id
            )));
        }
        self.returned_at = Some(at);
        self.outcome = Some(request.outcome);
        self.return_condition = request.condition;
        Ok(())
    }
}

/// Validated return request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReturnRequest {
    pub outcome: ReturnOutcome,
    /// Present for `Returned`, absent for `Lost`.
    pub condition: Option<ItemCondition>,
}

impl ReturnRequest {
    /// `outcome` defaults to `Returned`; a returned item must state its condition.
    pub fn new(outcome: Option<String>, condition: Option<String>) -> DomainResult<Self> {
        let outcome = match outcome.as_deref().map(str::trim) {
            None | Some("") => ReturnOutcome::Returned,
            Some(raw) => ReturnOutcome::parse(raw)?,
        };
        let condition = match (outcome, condition.as_deref().map(str::trim)) {
            (ReturnOutcome::Returned, None | Some("")) => {
                return Err(DomainError::validation("condition is required when returning an item"));
            }
            (ReturnOutcome::Returned, Some(raw)) => Some(ItemCondition::parse(raw)?),
            (ReturnOutcome::Lost, _) => None,
        };
        Ok(Self { outcome, condition })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Assignment {
        Assignment {
            id: AssignmentId::new(),
            item_id: ItemId::new(),
            barcode: Barcode::parse("TSM000001").unwrap(),
            inmate_id: InmateId::parse("INM001").unwrap(),
            assigned_at: Utc::now(),
            returned_at: None,
            outcome: None,
            return_condition: None,
        }
    }

    #[test]
    fn return_request_rules() {
        let r = ReturnRequest::new(None, Some("used".into())).unwrap();
        assert_eq!(r.outcome, ReturnOutcome::Returned);
        assert_eq!(r.condition, Some(ItemCondition::Used));

        assert!(ReturnRequest::new(None, None).is_err());

        let lost = ReturnRequest::new(Some("lost".into()), Some("Used".into())).unwrap();
        assert_eq!(lost.condition, None);

        assert!(ReturnRequest::new(Some("Stolen".into()), None).is_err());
    }

    #[test]
    fn assignment_closes_once() {
        let mut a = open();
        let req = ReturnRequest::new(None, Some("Worn".into())).unwrap();
        a.close(req, Utc::now()).unwrap();
        assert!(!a.is_open());
        assert_eq!(a.outcome, Some(ReturnOutcome::Returned));
        assert!(matches!(a.close(req, Utc::now()), Err(DomainError::Conflict(_))));
    }
}
