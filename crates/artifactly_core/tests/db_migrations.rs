use artifactly_core::db::migrations::latest_version;
use artifactly_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_object_exists(&conn, "table", "locations");
    assert_object_exists(&conn, "table", "artifacts");
    assert_object_exists(&conn, "table", "location_artifacts");
    assert_object_exists(&conn, "index", "idx_artifacts_name");
    assert_object_exists(&conn, "index", "idx_location_artifacts_location");
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let orphan = conn.execute(
        "INSERT INTO location_artifacts (artifact_uuid, location_uuid) VALUES ('a', 'l');",
        [],
    );
    assert!(orphan.is_err());
}

#[test]
fn location_uniqueness_is_backed_by_schema() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO locations (uuid, name, lat, lng) VALUES ('1', 'Home', '1.5', '2.5');",
        [],
    )
    .unwrap();

    let same_name = conn.execute(
        "INSERT INTO locations (uuid, name, lat, lng) VALUES ('2', 'Home', '3', '4');",
        [],
    );
    assert!(same_name.is_err());

    let same_coordinates = conn.execute(
        "INSERT INTO locations (uuid, name, lat, lng) VALUES ('3', 'Work', '1.5', '2.5');",
        [],
    );
    assert!(same_coordinates.is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("artifactly.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_object_exists(&conn_second, "table", "locations");
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

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
