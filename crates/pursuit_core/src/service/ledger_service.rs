//! Pursuit ledger use-case service.
//!
//! # Responsibility
//! - Expose the seven ledger operations over a `LedgerRepository`.
//! - Enforce per-operation preconditions in a fixed order: existence first,
//!   input validation second.
//!
//! # Invariants
//! - All checks complete before the single write of an operation; a failed
//!   check writes nothing.
//! - `eliminate` removes the chronicle only. Priority and deadline records of
//!   that identity stay behind as orphans and are never re-validated.
//! - `seed_for_other` does not relate the caller to the target in any way.
//! - Vision text is never logged; only lengths and identities are.

use crate::model::chronicle::{
    Chronicle, ChronicleValidationError, DeadlineMark, PriorityWeight, VisionText,
};
use crate::model::identity::{CallContext, Identity};
use crate::repo::ledger_repo::{LedgerRepository, RepoError};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failure outcome of a ledger operation.
#[derive(Debug)]
pub enum LedgerError {
    /// A required chronicle does not exist for the identity.
    EntityMissing(Identity),
    /// A chronicle already exists where uniqueness was required.
    RecordExists(Identity),
    /// An argument violates its domain constraint.
    InvalidInput(ChronicleValidationError),
    /// The backing store failed or returned corrupt data.
    Storage(RepoError),
}

impl LedgerError {
    pub const INVALID_INPUT_CODE: u32 = 400;
    pub const ENTITY_MISSING_CODE: u32 = 404;
    pub const RECORD_EXISTS_CODE: u32 = 409;
    pub const STORAGE_CODE: u32 = 500;

    /// Stable numeric code callers can branch on.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidInput(_) => Self::INVALID_INPUT_CODE,
            Self::EntityMissing(_) => Self::ENTITY_MISSING_CODE,
            Self::RecordExists(_) => Self::RECORD_EXISTS_CODE,
            Self::Storage(_) => Self::STORAGE_CODE,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::EntityMissing(_) => "entity_missing",
            Self::RecordExists(_) => "record_exists",
            Self::Storage(_) => "storage",
        }
    }
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntityMissing(identity) => write!(f, "no chronicle exists for `{identity}`"),
            Self::RecordExists(identity) => {
                write!(f, "a chronicle already exists for `{identity}`")
            }
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::Storage(err) => write!(f, "ledger storage failure: {err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ChronicleValidationError> for LedgerError {
    fn from(value: ChronicleValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for LedgerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(identity) => Self::EntityMissing(identity),
            RepoError::AlreadyExists(identity) => Self::RecordExists(identity),
            other => Self::Storage(other),
        }
    }
}

/// Success acknowledgement of a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Inscribed,
    WeightClassified,
    DeadlineEstablished,
    Seeded,
    Modified,
    Eliminated,
}

impl Confirmation {
    pub fn message(self) -> &'static str {
        match self {
            Self::Inscribed => "pursuit inscribed",
            Self::WeightClassified => "priority weight recorded",
            Self::DeadlineEstablished => "deadline established",
            Self::Seeded => "pursuit seeded for target identity",
            Self::Modified => "pursuit updated",
            Self::Eliminated => "pursuit eliminated",
        }
    }
}

impl Display for Confirmation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Read-only summary returned by `validate_presence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PresenceReport {
    pub present: bool,
    /// Character count of the stored vision; `0` when absent.
    pub description_length: u32,
    pub completion_achieved: bool,
}

impl PresenceReport {
    fn of(chronicle: Option<&Chronicle>) -> Self {
        chronicle.map_or_else(Self::default, |chronicle| Self {
            present: true,
            description_length: chronicle.vision.char_len(),
            completion_achieved: chronicle.fulfilled,
        })
    }
}

/// The per-identity pursuit ledger.
///
/// Owns its repository exclusively. Mutating operations take `&mut self`, so
/// invocations against one ledger are serialized by construction.
pub struct PursuitLedger<R: LedgerRepository> {
    repo: R,
}

impl<R: LedgerRepository> PursuitLedger<R> {
    /// Creates a ledger over the provided store implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an unfulfilled chronicle for the caller.
    ///
    /// # Errors
    /// - `RecordExists` when the caller already holds a chronicle.
    /// - `InvalidInput` when `vision_text` is not a valid `VisionText`.
    pub fn inscribe(&mut self, ctx: &CallContext, vision_text: &str) -> LedgerResult<Confirmation> {
        let repo = &mut self.repo;
        traced("inscribe", ctx, || {
            ensure_absent(repo, &ctx.caller)?;
            let vision = VisionText::new(vision_text)?;
            repo.insert_chronicle(&ctx.caller, &Chronicle::new(vision))?;
            Ok(Confirmation::Inscribed)
        })
    }

    /// Upserts the caller's priority weight.
    ///
    /// # Errors
    /// - `EntityMissing` when the caller holds no chronicle.
    /// - `InvalidInput` when `level` is outside `1..=3`.
    pub fn classify_weight(&mut self, ctx: &CallContext, level: u32) -> LedgerResult<Confirmation> {
        let repo = &mut self.repo;
        traced("classify_weight", ctx, || {
            ensure_present(repo, &ctx.caller)?;
            let weight = PriorityWeight::from_level(level)?;
            repo.upsert_priority(&ctx.caller, weight)?;
            Ok(Confirmation::WeightClassified)
        })
    }

    /// Upserts the caller's deadline at `block_height + duration`.
    ///
    /// `alert_processed` is reset to `false` on every call.
    ///
    /// # Errors
    /// - `EntityMissing` when the caller holds no chronicle.
    /// - `InvalidInput` when `duration == 0` or the target overflows.
    pub fn establish_deadline(
        &mut self,
        ctx: &CallContext,
        duration: u64,
    ) -> LedgerResult<Confirmation> {
        let repo = &mut self.repo;
        traced("establish_deadline", ctx, || {
            ensure_present(repo, &ctx.caller)?;
            let mark = DeadlineMark::from_offset(ctx.block_height, duration)?;
            repo.upsert_deadline(&ctx.caller, &mark)?;
            Ok(Confirmation::DeadlineEstablished)
        })
    }

    /// Creates an unfulfilled chronicle for `target`.
    ///
    /// Any caller may seed any identity that holds no chronicle; the caller's
    /// own records are neither required nor touched.
    ///
    /// # Errors
    /// - `RecordExists` when `target` already holds a chronicle.
    /// - `InvalidInput` when `vision_text` is not a valid `VisionText`.
    pub fn seed_for_other(
        &mut self,
        ctx: &CallContext,
        target: &Identity,
        vision_text: &str,
    ) -> LedgerResult<Confirmation> {
        let repo = &mut self.repo;
        traced("seed_for_other", ctx, || {
            ensure_absent(repo, target)?;
            let vision = VisionText::new(vision_text)?;
            repo.insert_chronicle(target, &Chronicle::new(vision))?;
            info!(
                "event=chronicle_seeded module=ledger caller={} target={}",
                ctx.caller, target
            );
            Ok(Confirmation::Seeded)
        })
    }

    /// Replaces the caller's chronicle with `{vision_text, completed}`.
    ///
    /// # Errors
    /// - `EntityMissing` when the caller holds no chronicle.
    /// - `InvalidInput` when `vision_text` is not a valid `VisionText`.
    pub fn modify(
        &mut self,
        ctx: &CallContext,
        vision_text: &str,
        completed: bool,
    ) -> LedgerResult<Confirmation> {
        let repo = &mut self.repo;
        traced("modify", ctx, || {
            ensure_present(repo, &ctx.caller)?;
            let vision = VisionText::new(vision_text)?;
            repo.replace_chronicle(&ctx.caller, &Chronicle::with_state(vision, completed))?;
            Ok(Confirmation::Modified)
        })
    }

    /// Deletes the caller's chronicle.
    ///
    /// Priority and deadline records are left in place.
    ///
    /// # Errors
    /// - `EntityMissing` when the caller holds no chronicle.
    pub fn eliminate(&mut self, ctx: &CallContext) -> LedgerResult<Confirmation> {
        let repo = &mut self.repo;
        traced("eliminate", ctx, || {
            ensure_present(repo, &ctx.caller)?;
            repo.delete_chronicle(&ctx.caller)?;
            Ok(Confirmation::Eliminated)
        })
    }

    /// Reports whether the caller holds a chronicle.
    ///
    /// Has no domain failure; only a storage fault can surface as an error.
    pub fn validate_presence(&self, ctx: &CallContext) -> LedgerResult<PresenceReport> {
        let chronicle = self.repo.get_chronicle(&ctx.caller)?;
        Ok(PresenceReport::of(chronicle.as_ref()))
    }

    /// Stored chronicle of any identity.
    pub fn chronicle_of(&self, identity: &Identity) -> LedgerResult<Option<Chronicle>> {
        Ok(self.repo.get_chronicle(identity)?)
    }

    /// Stored priority weight of any identity, orphaned or not.
    pub fn priority_of(&self, identity: &Identity) -> LedgerResult<Option<PriorityWeight>> {
        Ok(self.repo.get_priority(identity)?)
    }

    /// Stored deadline mark of any identity, orphaned or not.
    pub fn deadline_of(&self, identity: &Identity) -> LedgerResult<Option<DeadlineMark>> {
        Ok(self.repo.get_deadline(identity)?)
    }
}

fn ensure_absent<R: LedgerRepository>(repo: &R, identity: &Identity) -> LedgerResult<()> {
    if repo.get_chronicle(identity)?.is_some() {
        return Err(LedgerError::RecordExists(identity.clone()));
    }
    Ok(())
}

fn ensure_present<R: LedgerRepository>(repo: &R, identity: &Identity) -> LedgerResult<()> {
    if repo.get_chronicle(identity)?.is_none() {
        return Err(LedgerError::EntityMissing(identity.clone()));
    }
    Ok(())
}

fn traced<T>(
    op: &'static str,
    ctx: &CallContext,
    run: impl FnOnce() -> LedgerResult<T>,
) -> LedgerResult<T> {
    let outcome = run();
    match &outcome {
        Ok(_) => info!(
            "event=ledger_op module=ledger op={op} status=ok caller={} block_height={}",
            ctx.caller, ctx.block_height
        ),
        Err(err @ LedgerError::Storage(_)) => error!(
            "event=ledger_op module=ledger op={op} status=error caller={} block_height={} error_code={} error={err}",
            ctx.caller,
            ctx.block_height,
            err.code()
        ),
        Err(err) => warn!(
            "event=ledger_op module=ledger op={op} status=rejected caller={} block_height={} error_code={} reason={}",
            ctx.caller,
            ctx.block_height,
            err.code(),
            err.label()
        ),
    }
    outcome
}
