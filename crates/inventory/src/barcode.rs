//! Barcode identifiers and the candidate generator used to allocate them.
//!
//! A barcode is `TYPE + SIZE + SERIAL`, where the serial is six zero-padded
//! decimal digits drawn uniformly at random. Uniqueness against stored and
//! retired barcodes is decided by the caller (the storage layer); this module
//! only produces candidates and enforces the retry cap.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use commissary_core::{DomainError, DomainResult};

/// Size of the serial space per type/size pair.
pub const SERIAL_SPACE: u32 = 1_000_000;

/// Upper bound on candidates tried per allocation before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 1000;

const CODE_MAX: usize = 6;
const SERIAL_DIGITS: usize = 6;

fn normalize_code(field: &str, raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    if trimmed.len() > CODE_MAX {
        return Err(DomainError::validation(format!(
            "{field} must be at most {CODE_MAX} characters"
        )));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::validation(format!("{field} must be alphanumeric")));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Item type code (e.g. `TS` for t-shirt).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeCode(String);

impl TypeCode {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        normalize_code("type_code", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Item size/variant code (e.g. `M`, `XL`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SizeCode(String);

impl SizeCode {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        normalize_code("size_code", raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A printable item barcode. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Barcode(String);

impl Barcode {
    pub fn compose(type_code: &TypeCode, size_code: &SizeCode, serial: u32) -> Self {
        Self(format!(
            "{}{}{:0width$}",
            type_code.as_str(),
            size_code.as_str(),
            serial % SERIAL_SPACE,
            width = SERIAL_DIGITS
        ))
    }

    /// Accept a barcode as typed or scanned by an operator.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        let max = 2 * CODE_MAX + SERIAL_DIGITS;
        if trimmed.len() < 1 + 1 + SERIAL_DIGITS || trimmed.len() > max {
            return Err(DomainError::validation(format!("malformed barcode '{trimmed}'")));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation(format!("malformed barcode '{trimmed}'")));
        }
        let serial = &trimmed[trimmed.len() - SERIAL_DIGITS..];
        if !serial.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "barcode '{trimmed}' must end in {SERIAL_DIGITS} digits"
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Barcode> for String {
    fn from(value: Barcode) -> Self {
        value.0
    }
}

/// Source of random serials. Production uses the thread RNG; tests script it.
pub trait SerialSource: Send + Sync {
    /// Next serial in `0..SERIAL_SPACE`.
    fn next_serial(&self) -> u32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSerials;

impl SerialSource for ThreadRngSerials {
    fn next_serial(&self) -> u32 {
        rand::thread_rng().gen_range(0..SERIAL_SPACE)
    }
}

/// Produces barcode candidates for one type/size pair, bounded by an attempt cap.
#[derive(Debug, Clone)]
pub struct BarcodeAllocator {
    type_code: TypeCode,
    size_code: SizeCode,
    max_attempts: u32,
}

impl BarcodeAllocator {
    pub fn new(type_code: TypeCode, size_code: SizeCode) -> Self {
        Self {
            type_code,
            size_code,
            max_attempts: MAX_ALLOCATION_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `TYPE+SIZE`, used to label exhaustion errors and logs.
    pub fn prefix(&self) -> String {
        format!("{}{}", self.type_code.as_str(), self.size_code.as_str())
    }

    /// Candidate barcodes, at most `max_attempts` of them.
    pub fn candidates<'a>(&'a self, serials: &'a dyn SerialSource) -> impl Iterator<Item = Barcode> + 'a {
        (0..self.max_attempts)
            .map(move |_| Barcode::compose(&self.type_code, &self.size_code, serials.next_serial()))
    }

    /// Allocate against an in-memory view of taken barcodes.
    ///
    /// `is_taken` must answer for the union of active and retired barcodes.
    /// Returns `None` once the attempt cap is reached.
    pub fn allocate(
        &self,
        serials: &dyn SerialSource,
        mut is_taken: impl FnMut(&Barcode) -> bool,
    ) -> Option<Barcode> {
        self.candidates(serials).find(|candidate| !is_taken(candidate))
    }
}
