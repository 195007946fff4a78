//! Cadence engine and due-status classifier.
//!
//! # Responsibility
//! - Pure date arithmetic behind company due dates.
//! - Shared classification so every view buckets due dates identically.

pub mod cadence;
pub mod due_status;
