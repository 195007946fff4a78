//! Portfolio domain model.
//!
//! # Responsibility
//! - Define the two persisted record kinds: `Company` and `Update`.
//! - Own field-level validation shared by every storage backend.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Field names are the persistence contract for every backend.

pub mod company;
pub mod update;
pub mod validation;
