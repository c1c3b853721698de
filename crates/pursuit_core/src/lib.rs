//! Core domain logic for the pursuit ledger.
//! This crate is the single source of truth for ledger invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::chronicle::{
    Chronicle, ChronicleValidationError, DeadlineMark, PriorityWeight, VisionText,
    DEADLINE_MAX_HEIGHT, VISION_TEXT_MAX_CHARS,
};
pub use model::identity::{CallContext, Identity, IDENTITY_MAX_CHARS};
pub use repo::ledger_repo::{LedgerRepository, RepoError, RepoResult, SqliteLedgerRepository};
pub use repo::memory_repo::MemoryLedgerRepository;
pub use service::ledger_service::{
    Confirmation, LedgerError, LedgerResult, PresenceReport, PursuitLedger,
};

/// Minimal health-check API for smoke probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
