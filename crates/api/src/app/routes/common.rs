use axum::response::Response;

use commissary_core::{AssignmentId, InmateId};
use commissary_inventory::Barcode;

use crate::app::errors::domain_error_to_response;

pub fn parse_inmate_id(raw: &str) -> Result<InmateId, Response> {
    InmateId::parse(raw).map_err(domain_error_to_response)
}

pub fn parse_barcode(raw: &str) -> Result<Barcode, Response> {
    Barcode::parse(raw).map_err(domain_error_to_response)
}

pub fn parse_assignment_id(raw: &str) -> Result<AssignmentId, Response> {
    raw.parse::<AssignmentId>().map_err(domain_error_to_response)
}
