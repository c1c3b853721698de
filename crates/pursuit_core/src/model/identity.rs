//! Caller identity handles and per-invocation host context.
//!
//! # Responsibility
//! - Validate identity handles supplied by the host.
//! - Carry caller identity and current block height into every operation.
//!
//! # Invariants
//! - An `Identity` is non-empty, at most `IDENTITY_MAX_CHARS` long and made
//!   of principal-style characters only.
//! - Context is passed explicitly; nothing here is process-global.

use crate::model::chronicle::ChronicleValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Maximum accepted length of an identity handle, counted in characters.
pub const IDENTITY_MAX_CHARS: usize = 128;

static IDENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._:\-]*$").expect("valid identity regex"));

/// Authenticated participant handle; the key of every ledger store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Result<Self, ChronicleValidationError> {
        let value = value.into();
        if value.chars().count() > IDENTITY_MAX_CHARS || !IDENTITY_RE.is_match(&value) {
            return Err(ChronicleValidationError::InvalidIdentity(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = ChronicleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.0
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host-supplied inputs for a single ledger invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Authenticated caller of the operation.
    pub caller: Identity,
    /// Current time counter, read once per invocation.
    pub block_height: u64,
}

impl CallContext {
    pub fn new(caller: Identity, block_height: u64) -> Self {
        Self {
            caller,
            block_height,
        }
    }
}
