//! Persistence contracts and implementations for the three ledger stores.
//!
//! # Responsibility
//! - Define the store contract consumed by the ledger service.
//! - Keep SQLite details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths only accept already-validated model values.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Stores are independent: no write to one store touches another.

pub mod ledger_repo;
pub mod memory_repo;
