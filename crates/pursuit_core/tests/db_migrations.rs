use pursuit_core::db::migrations::latest_version;
use pursuit_core::db::{open_db, open_db_in_memory, DbError};
use pursuit_core::{
    CallContext, Identity, PriorityWeight, PursuitLedger, RepoError, SqliteLedgerRepository,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "chronicles");
    assert_table_exists(&conn, "priority_weights");
    assert_table_exists(&conn, "deadline_marks");
}

#[test]
fn reopening_file_database_is_idempotent_and_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    let alice = CallContext::new(Identity::new("alice").unwrap(), 12);

    {
        let conn = open_db(&path).unwrap();
        let mut ledger = PursuitLedger::new(SqliteLedgerRepository::try_new(&conn).unwrap());
        ledger.inscribe(&alice, "Persist me").unwrap();
        ledger.classify_weight(&alice, 1).unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let ledger = PursuitLedger::new(SqliteLedgerRepository::try_new(&conn).unwrap());
    let report = ledger.validate_presence(&alice).unwrap();
    assert!(report.present);
    assert_eq!(report.description_length, 10);
    assert_eq!(
        ledger.priority_of(&alice.caller).unwrap(),
        Some(PriorityWeight::Low)
    );
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "db_schema_too_new");
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_migration_rolls_back_and_reports_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clash.db");

    // An index already owns the `deadline_marks` name, so table creation fails.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE legacy (handle TEXT);
         CREATE INDEX deadline_marks ON legacy(handle);",
    )
    .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "db_migration_failed");
    assert!(matches!(err, DbError::Migration { version: 1, .. }));
    assert!(std::error::Error::source(&err).is_some());

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
    assert!(matches!(
        SqliteLedgerRepository::try_new(&conn).err().unwrap(),
        RepoError::MissingRequiredTable("chronicles")
    ));
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteLedgerRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("chronicles")));
}

#[test]
fn repository_rejects_table_missing_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE chronicles (identity TEXT PRIMARY KEY, vision TEXT);",
    )
    .unwrap();

    let err = SqliteLedgerRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "chronicles",
            column: "fulfilled"
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
