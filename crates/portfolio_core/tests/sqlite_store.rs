use chrono::NaiveDate;
use portfolio_core::db::migrations::latest_version;
use portfolio_core::db::{open_db, open_db_in_memory, DbError};
use portfolio_core::repo::record_store::{RecordKind, RecordStore, StoreError};
use portfolio_core::repo::sqlite_store::SqliteRecordStore;
use portfolio_core::repo::{open_store, StoreBackend, SQLITE_FILE_NAME};
use portfolio_core::{Cadence, Company, Update};
use rusqlite::Connection;

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "companies");
    assert_table_exists(&conn, "updates");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portfolio.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "companies");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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
fn current_version_without_tables_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreign.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::MissingTable(table) => assert_eq!(table, "companies"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sqlite_store_round_trips_company_and_update() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let mut acme = Company::new("Acme Robotics", Cadence::Quarterly, day(1, 15));
    acme.contact_name = "Ada".to_string();
    acme.contact_email = "ada@acme.test".to_string();
    store.create_company(&acme).unwrap();

    let mut update = Update::new(acme.company_id, "Q1 2025", "Ada", day(4, 2));
    update.runway_months = 18;
    update.narrative = "Line one\nLine two".to_string();
    store.create_update(&update).unwrap();

    assert_eq!(store.get_company(acme.company_id).unwrap(), Some(acme));
    assert_eq!(store.get_update(update.update_id).unwrap(), Some(update));
}

#[test]
fn sqlite_store_lists_updates_newest_first() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let acme = Company::new("Acme", Cadence::Monthly, day(1, 1));
    store.create_company(&acme).unwrap();
    for (period, date) in [("Feb", day(3, 1)), ("Apr", day(5, 1)), ("Mar", day(4, 1))] {
        store
            .create_update(&Update::new(acme.company_id, period, "Ada", date))
            .unwrap();
    }
    let periods: Vec<_> = store
        .list_updates()
        .unwrap()
        .into_iter()
        .map(|update| update.reporting_period)
        .collect();
    assert_eq!(periods, ["Apr", "Mar", "Feb"]);
}

#[test]
fn sqlite_store_cascades_company_delete_and_reports_missing() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let acme = Company::new("Acme", Cadence::Monthly, day(1, 1));
    let beta = Company::new("Beta", Cadence::Weekly, day(1, 1));
    store.create_company(&acme).unwrap();
    store.create_company(&beta).unwrap();
    store
        .create_update(&Update::new(acme.company_id, "Jan", "Ada", day(2, 1)))
        .unwrap();
    store
        .create_update(&Update::new(acme.company_id, "Feb", "Ada", day(3, 1)))
        .unwrap();
    let kept = Update::new(beta.company_id, "W5", "Bo", day(2, 3));
    store.create_update(&kept).unwrap();

    assert_eq!(store.delete_company(acme.company_id).unwrap(), 2);
    assert_eq!(store.list_companies().unwrap(), vec![beta]);
    assert_eq!(store.list_updates().unwrap(), vec![kept]);

    assert!(matches!(
        store.delete_company(acme.company_id),
        Err(StoreError::NotFound {
            kind: RecordKind::Company,
            ..
        })
    ));
}

#[test]
fn sqlite_store_rejects_updates_for_unknown_company() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let ghost = Company::new("Ghost", Cadence::Monthly, day(1, 1));
    let update = Update::new(ghost.company_id, "Jan", "Ada", day(2, 1));
    assert!(matches!(
        store.create_update(&update),
        Err(StoreError::UnknownCompany(_))
    ));
}

#[test]
fn sqlite_store_targeted_mutations_and_noops() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let acme = Company::new("Acme", Cadence::Biweekly, day(1, 1));
    store.create_company(&acme).unwrap();
    let update = Update::new(acme.company_id, "Jan", "Ada", day(2, 1));
    store.create_update(&update).unwrap();

    store.update_company_due_date(acme.company_id, None).unwrap();
    assert_eq!(
        store
            .get_company(acme.company_id)
            .unwrap()
            .unwrap()
            .next_due_date,
        None
    );

    store
        .set_update_pdf_path(update.update_id, "reports/update_Acme.pdf")
        .unwrap();
    assert_eq!(
        store.get_update(update.update_id).unwrap().unwrap().pdf_path,
        Some("reports/update_Acme.pdf".to_string())
    );

    assert!(!store.delete_update(uuid::Uuid::new_v4()).unwrap());
    assert!(store.delete_update(update.update_id).unwrap());
}

#[test]
fn unknown_cadence_text_survives_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(StoreBackend::Sqlite, dir.path()).unwrap();
    let odd = Company::new("Odd", Cadence::parse("semiannual"), day(1, 1));
    store.create_company(&odd).unwrap();
    drop(store);

    assert!(dir.path().join(SQLITE_FILE_NAME).exists());
    let reopened = open_store(StoreBackend::Sqlite, dir.path()).unwrap();
    let stored = reopened.get_company(odd.company_id).unwrap().unwrap();
    assert_eq!(stored.reporting_cadence, Cadence::Other("semiannual".to_string()));
    assert_eq!(stored.next_due_date, Some(day(1, 31)));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "expected table `{table_name}` to exist");
}

#[test]
fn hand_edited_row_failing_validation_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portfolio.sqlite3");
    let store = SqliteRecordStore::open(&path).unwrap();
    let acme = Company::new("Acme", Cadence::Monthly, day(1, 1));
    store.create_company(&acme).unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE companies SET contact_email = 'not-an-email' WHERE company_id = ?1;",
        [acme.company_id.to_string()],
    )
    .unwrap();
    drop(conn);

    let companies = store.list_companies().unwrap();
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].contact_email, "not-an-email");
    assert_eq!(store.delete_company(acme.company_id).unwrap(), 0);
}

#[test]
fn sqlite_store_toggles_company_activity() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let acme = Company::new("Acme", Cadence::Monthly, day(1, 1));
    store.create_company(&acme).unwrap();

    store.set_company_active(acme.company_id, false).unwrap();
    assert!(!store.get_company(acme.company_id).unwrap().unwrap().is_active);
    store.set_company_active(acme.company_id, true).unwrap();
    assert!(store.get_company(acme.company_id).unwrap().unwrap().is_active);

    let missing = uuid::Uuid::new_v4();
    assert!(matches!(
        store.set_company_active(missing, false),
        Err(StoreError::NotFound { kind: RecordKind::Company, id }) if id == missing
    ));
}
