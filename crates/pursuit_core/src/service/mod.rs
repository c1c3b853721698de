//! Ledger use-case services.
//!
//! # Responsibility
//! - Turn store reads/writes into the public ledger operations.
//! - Keep callers decoupled from storage details.

pub mod ledger_service;
