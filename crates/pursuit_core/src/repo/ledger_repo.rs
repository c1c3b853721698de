//! Ledger store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide keyed read/write access to chronicles, priority weights and
//!   deadline marks.
//! - Surface semantic outcomes (`NotFound`, `AlreadyExists`) next to
//!   transport errors.
//!
//! # Invariants
//! - Every mutation is a single SQL statement (all-or-nothing).
//! - Removing a chronicle never touches the priority or deadline tables.

use crate::db::DbError;
use crate::model::chronicle::{Chronicle, DeadlineMark, PriorityWeight, VisionText};
use crate::model::identity::Identity;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for ledger persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(Identity),
    AlreadyExists(Identity),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(identity) => write!(f, "chronicle not found for `{identity}`"),
            Self::AlreadyExists(identity) => {
                write!(f, "chronicle already exists for `{identity}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Keyed access to the three per-identity ledger stores.
pub trait LedgerRepository {
    fn get_chronicle(&self, identity: &Identity) -> RepoResult<Option<Chronicle>>;
    /// Inserts a chronicle; fails with `AlreadyExists` instead of overwriting.
    fn insert_chronicle(&mut self, identity: &Identity, chronicle: &Chronicle) -> RepoResult<()>;
    /// Replaces both chronicle fields; fails with `NotFound` when absent.
    fn replace_chronicle(&mut self, identity: &Identity, chronicle: &Chronicle)
        -> RepoResult<()>;
    /// Deletes the chronicle only; fails with `NotFound` when absent.
    fn delete_chronicle(&mut self, identity: &Identity) -> RepoResult<()>;

    fn get_priority(&self, identity: &Identity) -> RepoResult<Option<PriorityWeight>>;
    fn upsert_priority(&mut self, identity: &Identity, weight: PriorityWeight) -> RepoResult<()>;

    fn get_deadline(&self, identity: &Identity) -> RepoResult<Option<DeadlineMark>>;
    fn upsert_deadline(&mut self, identity: &Identity, mark: &DeadlineMark) -> RepoResult<()>;
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("chronicles", &["identity", "vision", "fulfilled"]),
    ("priority_weights", &["identity", "weight"]),
    ("deadline_marks", &["identity", "target_height", "alert_processed"]),
];

/// SQLite-backed ledger stores.
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    /// Creates a repository over a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema has
    ///   not been migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_ledger_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn get_chronicle(&self, identity: &Identity) -> RepoResult<Option<Chronicle>> {
        let row = self
            .conn
            .query_row(
                "SELECT vision, fulfilled FROM chronicles WHERE identity = ?1;",
                [identity.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        let Some((vision, fulfilled)) = row else {
            return Ok(None);
        };
        let vision = VisionText::new(vision).map_err(|err| {
            RepoError::InvalidData(format!(
                "chronicles.vision for `{identity}` fails validation: {err}"
            ))
        })?;
        let fulfilled = int_to_bool(fulfilled, "chronicles.fulfilled")?;
        Ok(Some(Chronicle::with_state(vision, fulfilled)))
    }

    fn insert_chronicle(&mut self, identity: &Identity, chronicle: &Chronicle) -> RepoResult<()> {
        let changed = self.conn.execute(
            "INSERT INTO chronicles (identity, vision, fulfilled)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(identity) DO NOTHING;",
            params![
                identity.as_str(),
                chronicle.vision.as_str(),
                bool_to_int(chronicle.fulfilled),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::AlreadyExists(identity.clone()));
        }
        Ok(())
    }

    fn replace_chronicle(
        &mut self,
        identity: &Identity,
        chronicle: &Chronicle,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE chronicles
             SET vision = ?2, fulfilled = ?3
             WHERE identity = ?1;",
            params![
                identity.as_str(),
                chronicle.vision.as_str(),
                bool_to_int(chronicle.fulfilled),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(identity.clone()));
        }
        Ok(())
    }

    fn delete_chronicle(&mut self, identity: &Identity) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM chronicles WHERE identity = ?1;",
            [identity.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(identity.clone()));
        }
        Ok(())
    }

    fn get_priority(&self, identity: &Identity) -> RepoResult<Option<PriorityWeight>> {
        let weight = self
            .conn
            .query_row(
                "SELECT weight FROM priority_weights WHERE identity = ?1;",
                [identity.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        weight
            .map(|value| {
                u32::try_from(value)
                    .ok()
                    .and_then(|level| PriorityWeight::from_level(level).ok())
                    .ok_or_else(|| {
                        RepoError::InvalidData(format!(
                            "invalid weight `{value}` in priority_weights.weight"
                        ))
                    })
            })
            .transpose()
    }

    fn upsert_priority(&mut self, identity: &Identity, weight: PriorityWeight) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO priority_weights (identity, weight)
             VALUES (?1, ?2)
             ON CONFLICT(identity) DO UPDATE SET weight = excluded.weight;",
            params![identity.as_str(), i64::from(weight.level())],
        )?;
        Ok(())
    }

    fn get_deadline(&self, identity: &Identity) -> RepoResult<Option<DeadlineMark>> {
        let row = self
            .conn
            .query_row(
                "SELECT target_height, alert_processed FROM deadline_marks WHERE identity = ?1;",
                [identity.as_str()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        let Some((target_height, alert_processed)) = row else {
            return Ok(None);
        };
        let target_height = u64::try_from(target_height).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid target_height `{target_height}` in deadline_marks.target_height"
            ))
        })?;
        Ok(Some(DeadlineMark {
            target_height,
            alert_processed: int_to_bool(alert_processed, "deadline_marks.alert_processed")?,
        }))
    }

    fn upsert_deadline(&mut self, identity: &Identity, mark: &DeadlineMark) -> RepoResult<()> {
        // SQLite integers are signed; heights past i64::MAX cannot be stored.
        let target_height = i64::try_from(mark.target_height).map_err(|_| {
            RepoError::InvalidData(format!(
                "target_height {} exceeds storable range",
                mark.target_height
            ))
        })?;

        self.conn.execute(
            "INSERT INTO deadline_marks (identity, target_height, alert_processed)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(identity) DO UPDATE SET
                target_height = excluded.target_height,
                alert_processed = excluded.alert_processed;",
            params![
                identity.as_str(),
                target_height,
                bool_to_int(mark.alert_processed),
            ],
        )?;
        Ok(())
    }
}

fn ensure_ledger_connection_ready(conn: &Connection) -> RepoResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
