use localestore_core::db::migrations::{current_user_version, latest_version};
use localestore_core::db::{open_db, open_db_in_memory, open_session, DbError};
use localestore_core::CoreConfig;
use rusqlite::Connection;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_millis(1_000);

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory(BUSY_TIMEOUT).unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "translations");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("localestore.db");

    let conn_first = open_db(&path, BUSY_TIMEOUT).unwrap();
    conn_first
        .execute(
            "INSERT INTO translations (locale, object_class, field, foreign_key, content)
             VALUES ('es', 'Article', 'title', 'a1', 'Hola');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path, BUSY_TIMEOUT).unwrap();
    assert_eq!(current_user_version(&conn_second).unwrap(), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM translations;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path, BUSY_TIMEOUT).unwrap_err();
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
fn failing_migration_reports_version_and_keeps_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clashing.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE translations (id INTEGER PRIMARY KEY);")
        .unwrap();
    drop(conn);

    let err = open_db(&path, BUSY_TIMEOUT).unwrap_err();
    match err {
        DbError::Migration { version, .. } => assert_eq!(version, 1),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(schema_version_at(&path), 0);
}

fn schema_version_at(path: &std::path::Path) -> u32 {
    let conn = Connection::open(path).unwrap();
    current_user_version(&conn).unwrap()
}

#[test]
fn translation_rows_are_unique_per_locale_field_and_row() {
    let conn = open_db_in_memory(BUSY_TIMEOUT).unwrap();
    let insert = "INSERT INTO translations (locale, object_class, field, foreign_key, content)
                  VALUES (?1, 'Article', 'title', 'a1', 'x');";

    conn.execute(insert, ["es"]).unwrap();
    conn.execute(insert, ["de"]).unwrap();
    assert!(conn.execute(insert, ["es"]).is_err());
}

#[test]
fn open_session_on_file_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.db");
    let config = CoreConfig::default();

    let session = open_session(&path, &config).unwrap();
    assert_eq!(session.pending_changes(), 0);
    assert_eq!(
        current_user_version(session.connection()).unwrap(),
        latest_version()
    );
    drop(session);

    let reopened = open_session(&path, &config).unwrap();
    assert_table_exists(reopened.connection(), "translations");
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "expected table `{table_name}` to exist");
}
