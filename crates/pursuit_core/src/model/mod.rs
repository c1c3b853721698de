//! Domain model for the pursuit ledger.
//!
//! # Responsibility
//! - Define the three per-identity records (chronicle, priority, deadline).
//! - Own construction-time validation for identity handles and vision text.
//!
//! # Invariants
//! - Every record is keyed by exactly one `Identity`.
//! - A `VisionText` is never empty and never longer than its capacity.

pub mod chronicle;
pub mod identity;
