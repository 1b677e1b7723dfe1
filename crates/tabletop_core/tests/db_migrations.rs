use rusqlite::Connection;
use tabletop_core::db::migrations::{
    stored_schema_version, supported_schema_version, upgrade_schema,
};
use tabletop_core::db::{open_db, open_db_in_memory, DbError};
use tabletop_core::{GameCollection, RepoError, SqliteGameRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), supported_schema_version());
    assert_table_has_columns(
        &conn,
        "games",
        &[
            "id",
            "collection",
            "owner_id",
            "title",
            "description",
            "containers_json",
            "counters_json",
            "action_history_json",
            "revision",
            "updated_at",
        ],
    );
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabletop.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), supported_schema_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), supported_schema_version());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, supported_schema_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn upgrade_moves_fresh_file_from_zero_to_supported() {
    let mut conn = Connection::open_in_memory().unwrap();
    assert_eq!(stored_schema_version(&conn).unwrap(), 0);

    upgrade_schema(&mut conn).unwrap();
    assert_eq!(stored_schema_version(&conn).unwrap(), supported_schema_version());
    upgrade_schema(&mut conn).unwrap();
    assert_eq!(stored_schema_version(&conn).unwrap(), supported_schema_version());
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let mut conn = Connection::open_in_memory().unwrap();
    let err = SqliteGameRepository::try_new(&mut conn, GameCollection::Games)
        .err()
        .expect("raw connection must be rejected");
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_has_columns(conn: &Connection, table: &str, expected: &[&str]) {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});")).unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut columns = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        let name: String = row.get(1).unwrap();
        columns.push(name);
    }
    for column in expected {
        assert!(
            columns.iter().any(|name| name == column),
            "column {column} missing from {table}"
        );
    }
}
