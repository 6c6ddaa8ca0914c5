//! Counter and create-retry behaviour against SeaORM's mock PostgreSQL backend.
//!
//! Each mock connection replays the query and exec results in the order the
//! code issues them, so the statements a test appends describe the exact
//! round trips expected.
mod common;

use std::collections::BTreeMap;

use chrono::Days;
use sea_orm::{
    DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, TransactionTrait,
    Value,
};
use uuid::Uuid;

use common::{booking, time};
use gig_agenda::config::ScheduleConfig;
use gig_agenda::db::{contracts as contract_db, sequences};
use gig_agenda::engine::numbering;
use gig_agenda::error::AppError;
use gig_agenda::models::{contract_sequences, contracts};

fn counter(prefix: &str, last_value: i32) -> contract_sequences::Model {
    contract_sequences::Model {
        prefix: prefix.to_string(),
        last_value,
    }
}

fn issued(numbers: &[String]) -> Vec<BTreeMap<&'static str, Value>> {
    numbers
        .iter()
        .map(|n| BTreeMap::from([("contract_number", Value::from(n.clone()))]))
        .collect()
}

fn rows(affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: affected,
    }
}

fn client_found() -> Vec<BTreeMap<&'static str, Value>> {
    vec![BTreeMap::from([("num_items", Value::from(1i64))])]
}

fn lock_held() -> Vec<BTreeMap<&'static str, Value>> {
    vec![BTreeMap::from([("held", Value::from(1i32))])]
}

fn statements(db: DatabaseConnection) -> Vec<String> {
    db.into_transaction_log()
        .iter()
        .flat_map(|t| t.statements().to_vec())
        .map(|s| s.sql)
        .collect()
}

async fn reserve(db: &DatabaseConnection, prefix: &str, reseed: bool) -> Result<u32, DbErr> {
    let txn = db.begin().await?;
    let next = sequences::next_value(&txn, prefix, reseed).await?;
    txn.commit().await?;
    Ok(next)
}

#[tokio::test]
async fn existing_counter_is_incremented_without_scanning_contracts() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![counter("CT-2025", 7)]])
        .append_exec_results([rows(1)])
        .into_connection();

    assert_eq!(reserve(&db, "CT-2025", false).await.unwrap(), 8);

    let sql = statements(db);
    assert!(sql.iter().any(|s| s.contains("FOR UPDATE")));
    assert!(!sql.iter().any(|s| s.contains(r#"FROM "contracts""#)));
}

#[tokio::test]
async fn missing_counter_is_seeded_from_issued_numbers() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<contract_sequences::Model>::new()])
        .append_query_results([issued(&[
            "CT-2025-0009".to_string(),
            "CT-2025-0012".to_string(),
        ])])
        .append_query_results([vec![counter("CT-2025", 12)]])
        .append_exec_results([rows(1), rows(1)])
        .into_connection();

    assert_eq!(reserve(&db, "CT-2025", false).await.unwrap(), 13);

    let sql = statements(db);
    assert!(sql.iter().any(|s| s.contains("ON CONFLICT")));
}

#[tokio::test]
async fn reseed_skips_numbers_issued_outside_the_counter() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![counter("CT-2025", 3)]])
        .append_query_results([issued(&["CT-2025-0004".to_string()])])
        .append_exec_results([rows(1)])
        .into_connection();

    assert_eq!(reserve(&db, "CT-2025", true).await.unwrap(), 5);
}

#[tokio::test]
async fn reseed_never_moves_the_counter_back() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![counter("CT-2025", 9)]])
        .append_query_results([issued(&["CT-2025-0004".to_string()])])
        .append_exec_results([rows(1)])
        .into_connection();

    assert_eq!(reserve(&db, "CT-2025", true).await.unwrap(), 10);
}

/// Mock results for one pass of the create pipeline up to the insert:
/// client check, advisory lock, siblings, counter row and (on reseed) the scan.
fn create_attempt(
    mock: MockDatabase,
    prefix: &str,
    last_value: i32,
    scanned: Option<&[String]>,
) -> MockDatabase {
    let mock = mock
        .append_query_results([client_found()])
        .append_query_results([lock_held()])
        .append_query_results([Vec::<contracts::Model>::new()])
        .append_query_results([vec![counter(prefix, last_value)]]);
    match scanned {
        Some(numbers) => mock.append_query_results([issued(numbers)]),
        None => mock,
    }
}

fn future_booking(config: &ScheduleConfig) -> contracts::CreateContract {
    let mut input = booking(Uuid::new_v4(), time(20, 0), time(23, 0));
    input.event_date = config.local_now().date() + Days::new(30);
    input
}

#[tokio::test]
async fn taken_number_is_retried_once_with_a_reseeded_counter() {
    let config = ScheduleConfig::default();
    let prefix = numbering::sequence_prefix(config.local_now().date());
    let taken = numbering::format_contract_number(&prefix, 4);

    let mock = create_attempt(
        MockDatabase::new(DatabaseBackend::Postgres),
        &prefix,
        3,
        None,
    )
    .append_exec_results([rows(1), rows(0)]);
    let db = create_attempt(mock, &prefix, 3, Some(&[taken][..]))
        .append_exec_results([rows(1), rows(1), rows(0)])
        .into_connection();

    let created = contract_db::create_contract(&db, future_booking(&config), config)
        .await
        .unwrap();

    assert_eq!(
        created.contract.contract_number,
        numbering::format_contract_number(&prefix, 5)
    );
    let inserts = statements(db)
        .iter()
        .filter(|s| s.starts_with(r#"INSERT INTO "contracts""#))
        .count();
    assert_eq!(inserts, 2);
}

#[tokio::test]
async fn second_collision_gives_up_as_retryable() {
    let config = ScheduleConfig::default();
    let prefix = numbering::sequence_prefix(config.local_now().date());
    let taken = numbering::format_contract_number(&prefix, 4);

    let mock = create_attempt(
        MockDatabase::new(DatabaseBackend::Postgres),
        &prefix,
        3,
        None,
    )
    .append_exec_results([rows(1), rows(0)]);
    let db = create_attempt(mock, &prefix, 3, Some(&[taken][..]))
        .append_exec_results([rows(1), rows(0)])
        .into_connection();

    let err = contract_db::create_contract(&db, future_booking(&config), config)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UniquenessRace(_)));
    assert!(err.is_retryable());
    let inserts = statements(db)
        .iter()
        .filter(|s| s.starts_with(r#"INSERT INTO "contracts""#))
        .count();
    assert_eq!(inserts, 2);
}

#[tokio::test]
async fn other_database_errors_are_not_retried() {
    let config = ScheduleConfig::default();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection reset".to_string())])
        .into_connection();

    let err = contract_db::create_contract(&db, future_booking(&config), config)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Database(_)));
    assert!(!err.is_retryable());
    assert_eq!(db.into_transaction_log().len(), 1);
}
