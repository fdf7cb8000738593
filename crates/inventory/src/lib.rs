//! Inventory domain module.
//!
//! This crate contains business rules for physical property items, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage):
//! barcode allocation, item lifecycle, and item-to-inmate assignments.

pub mod assignment;
pub mod barcode;
pub mod item;

pub use assignment::{Assignment, ReturnOutcome, ReturnRequest};
pub use barcode::{
    Barcode, BarcodeAllocator, SerialSource, SizeCode, ThreadRngSerials, TypeCode,
    MAX_ALLOCATION_ATTEMPTS, SERIAL_SPACE,
};
pub use item::{Item, ItemCondition, ItemStatus, NewItem};
