//! Chronicle, priority and deadline records.
//!
//! # Responsibility
//! - Define the canonical pursuit record (`Chronicle`) and its two
//!   annotations (`PriorityWeight`, `DeadlineMark`).
//! - Validate bounded vision text and priority levels at construction.
//!
//! # Invariants
//! - `VisionText` holds 1..=`VISION_TEXT_MAX_CHARS` characters, none of
//!   them control characters.
//! - `PriorityWeight` is always one of the levels 1, 2 or 3.
//! - `DeadlineMark::alert_processed` starts `false` on every write.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Hard capacity of a vision description, counted in characters.
pub const VISION_TEXT_MAX_CHARS: usize = 100;

/// Largest storable deadline height (SQLite integers are signed 64-bit).
pub const DEADLINE_MAX_HEIGHT: u64 = i64::MAX as u64;

/// Construction-time validation failures for ledger model values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChronicleValidationError {
    EmptyVisionText,
    ControlCharacterInVision { position: usize },
    VisionTextTooLong { max_chars: usize, actual_chars: usize },
    WeightOutOfRange(u32),
    ZeroDuration,
    DeadlineOutOfRange { block_height: u64, duration: u64 },
    InvalidIdentity(String),
}

impl Display for ChronicleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyVisionText => write!(f, "vision text cannot be empty"),
            Self::ControlCharacterInVision { position } => {
                write!(f, "vision text has a control character at position {position}")
            }
            Self::VisionTextTooLong {
                max_chars,
                actual_chars,
            } => write!(
                f,
                "vision text has {actual_chars} characters; capacity is {max_chars}"
            ),
            Self::WeightOutOfRange(level) => {
                write!(f, "priority level {level} is outside the range 1..=3")
            }
            Self::ZeroDuration => write!(f, "deadline duration must be positive"),
            Self::DeadlineOutOfRange {
                block_height,
                duration,
            } => write!(
                f,
                "deadline {block_height} + {duration} exceeds the maximum height {DEADLINE_MAX_HEIGHT}"
            ),
            Self::InvalidIdentity(value) => write!(f, "invalid identity handle `{value}`"),
        }
    }
}

impl Error for ChronicleValidationError {}

/// Fixed-capacity, non-empty description of a pursuit.
///
/// Oversize input is rejected, never truncated. Control characters (NUL,
/// newlines, tabs) are rejected as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VisionText(String);

impl VisionText {
    pub fn new(value: impl Into<String>) -> Result<Self, ChronicleValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ChronicleValidationError::EmptyVisionText);
        }
        if let Some(position) = value.chars().position(char::is_control) {
            return Err(ChronicleValidationError::ControlCharacterInVision { position });
        }
        let actual_chars = value.chars().count();
        if actual_chars > VISION_TEXT_MAX_CHARS {
            return Err(ChronicleValidationError::VisionTextTooLong {
                max_chars: VISION_TEXT_MAX_CHARS,
                actual_chars,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters; always within `1..=VISION_TEXT_MAX_CHARS`.
    pub fn char_len(&self) -> u32 {
        // Bounded by VISION_TEXT_MAX_CHARS, so the cast cannot truncate.
        self.0.chars().count() as u32
    }
}

impl TryFrom<String> for VisionText {
    type Error = ChronicleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for VisionText {
    type Error = ChronicleValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VisionText> for String {
    fn from(value: VisionText) -> Self {
        value.0
    }
}

impl Display for VisionText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The pursuit record owned by one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chronicle {
    /// What the identity is pursuing.
    pub vision: VisionText,
    /// Whether the pursuit has been fulfilled. `false` on creation.
    pub fulfilled: bool,
}

impl Chronicle {
    /// Creates a fresh, unfulfilled chronicle.
    pub fn new(vision: VisionText) -> Self {
        Self {
            vision,
            fulfilled: false,
        }
    }

    /// Builds a chronicle with an explicit completion state.
    ///
    /// Used by wholesale replacement, where both fields change together.
    pub fn with_state(vision: VisionText, fulfilled: bool) -> Self {
        Self { vision, fulfilled }
    }
}

/// Priority classification attached to an identity's pursuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PriorityWeight {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl PriorityWeight {
    pub fn from_level(level: u32) -> Result<Self, ChronicleValidationError> {
        match level {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(ChronicleValidationError::WeightOutOfRange(other)),
        }
    }

    pub fn level(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for PriorityWeight {
    type Error = ChronicleValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_level(value)
    }
}

impl From<PriorityWeight> for u32 {
    fn from(value: PriorityWeight) -> Self {
        value.level()
    }
}

/// Absolute deadline attached to an identity's pursuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineMark {
    /// Block height at which the pursuit is due.
    pub target_height: u64,
    /// Owned by the external alerting process; this crate only resets it.
    pub alert_processed: bool,
}

impl DeadlineMark {
    /// Creates a mark due at `target_height` with no alert processed yet.
    pub fn new(target_height: u64) -> Self {
        Self {
            target_height,
            alert_processed: false,
        }
    }

    /// Computes the mark due `duration` blocks after `block_height`.
    ///
    /// # Errors
    /// - `ZeroDuration` when `duration == 0`.
    /// - `DeadlineOutOfRange` when the sum passes `DEADLINE_MAX_HEIGHT`.
    pub fn from_offset(block_height: u64, duration: u64) -> Result<Self, ChronicleValidationError> {
        if duration == 0 {
            return Err(ChronicleValidationError::ZeroDuration);
        }
        block_height
            .checked_add(duration)
            .filter(|target| *target <= DEADLINE_MAX_HEIGHT)
            .map(Self::new)
            .ok_or(ChronicleValidationError::DeadlineOutOfRange {
                block_height,
                duration,
            })
    }
}
