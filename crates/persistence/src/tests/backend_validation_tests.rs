// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend validation tests for multi-database support.
//!
//! These tests validate that the persistence layer works correctly
//! across different database backends (`SQLite`, MariaDB/MySQL).
//!
//! ## Purpose
//!
//! The purpose of these tests is to ensure:
//! 1. Migrations apply cleanly on all supported backends
//! 2. Foreign key constraints are enforced correctly
//! 3. Unique constraints work as expected
//! 4. Transactions and rollback behavior is consistent
//! 5. Backend-specific behavior is documented and tested
//!
//! ## Test Execution
//!
//! - `SQLite` tests run normally via `cargo test`
//! - MariaDB/MySQL tests are marked `#[ignore]` and run only via `cargo xtask test-mariadb`
//!
//! ## Infrastructure Requirements
//!
//! `MariaDB` tests require:
//! - `DATABASE_URL` environment variable (set by xtask)
//! - `WASHNET_TEST_BACKEND=mariadb` environment variable
//! - Running `MariaDB` instance (provisioned by xtask)
//!
//! Tests fail fast if required infrastructure is missing.
//!
//! ## What These Tests Validate
//!
//! These tests focus on **infrastructure and schema compatibility**, not business logic:
//! - Schema creation and migration application
//! - Database constraint enforcement (FK, UNIQUE, CHECK)
//! - Transaction semantics
//! - Backend-specific SQL compatibility
//!
//! Business logic and domain rules are validated by the standard test suite
//! running against `SQLite`. These backend validation tests ensure the
//! persistence layer works correctly on additional databases.
//!
//! ## Adding New Backend Validation Tests
//!
//! When adding a new test:
//! 1. Mark it with `#[ignore]`
//! 2. Call `verify_mariadb_test_environment()` first
//! 3. Use raw SQL to test schema-level behavior
//! 4. Clean up test data if needed (or use transactions)
//! 5. Document what backend-specific behavior is being validated

use diesel::MysqlConnection;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use std::env;

use crate::backend::mysql;

/// Result type for COUNT queries.
#[derive(QueryableByName)]
struct CountResult {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Result type for `LAST_INSERT_ID` queries.
#[derive(QueryableByName)]
struct LastInsertIdResult {
    #[diesel(sql_type = BigInt)]
    id: i64,
}

/// Helper to get the `MariaDB` connection URL from environment.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set, indicating missing infrastructure.
fn get_mariadb_url() -> String {
    env::var("DATABASE_URL")
        .expect("DATABASE_URL not set - MariaDB tests must be run via `cargo xtask test-mariadb`")
}

/// Helper to verify we're running in the `MariaDB` test environment.
///
/// # Panics
///
/// Panics if `WASHNET_TEST_BACKEND` is not set to `mariadb`.
fn verify_mariadb_test_environment() {
    let backend = env::var("WASHNET_TEST_BACKEND").expect(
        "WASHNET_TEST_BACKEND not set - MariaDB tests must be run via `cargo xtask test-mariadb`",
    );
    assert_eq!(backend, "mariadb", "WASHNET_TEST_BACKEND must be 'mariadb'");
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_connection() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let result = MysqlConnection::establish(&url);
    assert!(
        result.is_ok(),
        "Failed to connect to MariaDB: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_migrations_apply_cleanly() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let result = mysql::initialize_database(&url);
    assert!(
        result.is_ok(),
        "Failed to initialize MariaDB and run migrations: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_foreign_key_enforcement() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    let result = mysql::verify_foreign_key_enforcement(&mut conn);
    assert!(
        result.is_ok(),
        "Foreign key enforcement verification failed: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_partner_code_unique_constraint() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    // Use a dedicated network id to avoid conflicts with other tests
    diesel::sql_query(
        "INSERT INTO partner_companies (network_id, code, name, billing_type, is_active)
         VALUES (901, 'UNIQ-01', 'First Kft.', 'cash', 1)",
    )
    .execute(&mut conn)
    .expect("Failed to insert partner");

    let duplicate_result = diesel::sql_query(
        "INSERT INTO partner_companies (network_id, code, name, billing_type, is_active)
         VALUES (901, 'UNIQ-01', 'Second Kft.', 'cash', 1)",
    )
    .execute(&mut conn);

    assert!(
        duplicate_result.is_err(),
        "Duplicate (network_id, code) should fail due to UNIQUE constraint"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_wash_event_location_foreign_key() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    // Try to insert a wash event against a non-existent location
    let result = diesel::sql_query(
        "INSERT INTO wash_events
         (network_id, location_id, entry_mode, service_package_id, vehicle_type, status, created_at)
         VALUES (902, 99999, 'manual_operator', 1, 'tractor', 'created', '2026-01-12T10:30:00Z')",
    )
    .execute(&mut conn);

    assert!(
        result.is_err(),
        "Wash event with non-existent location_id should fail due to foreign key constraint"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_unique_draft_guard() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    diesel::sql_query(
        "INSERT INTO partner_companies (network_id, code, name, billing_type, is_active)
         VALUES (903, 'DRAFT-01', 'Draft Kft.', 'contract', 1)",
    )
    .execute(&mut conn)
    .expect("Failed to insert partner");

    let partner_company_id: i64 = diesel::sql_query("SELECT LAST_INSERT_ID() as id")
        .get_result::<LastInsertIdResult>(&mut conn)
        .map(|r| r.id)
        .expect("Failed to get partner_company_id");

    let insert_invoice = |status: &str| {
        format!(
            "INSERT INTO invoices
             (network_id, partner_company_id, period_start, period_end, subtotal,
              discount_percent, discount_amount, vat_rate, vat_amount, total, currency,
              status, issue_date, due_date)
             VALUES (903, {partner_company_id}, '2026-01-01', '2026-01-31', 0,
                     0, 0, 27, 0, 0, 'HUF', '{status}', '2026-02-01', '2026-02-16')"
        )
    };

    diesel::sql_query(insert_invoice("draft"))
        .execute(&mut conn)
        .expect("Failed to insert first draft");

    // A second draft for the same partner and period must violate the
    // generated draft_guard unique key
    let duplicate_draft = diesel::sql_query(insert_invoice("draft")).execute(&mut conn);
    assert!(
        duplicate_draft.is_err(),
        "Second draft for the same partner/period should fail due to the draft guard"
    );

    // Non-draft statuses are exempt: the guard column is NULL
    diesel::sql_query(insert_invoice("cancelled"))
        .execute(&mut conn)
        .expect("A cancelled invoice for the same period must not trip the guard");

    let count: i64 = diesel::sql_query(format!(
        "SELECT COUNT(*) as count FROM invoices WHERE partner_company_id = {partner_company_id}"
    ))
    .get_result::<CountResult>(&mut conn)
    .map(|r| r.count)
    .expect("Failed to count invoices");
    assert_eq!(count, 2);
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_active_price_unique_guard() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    diesel::sql_query(
        "INSERT INTO service_prices
         (network_id, service_package_id, vehicle_type, price, currency, is_active)
         VALUES (904, 1, 'tractor', 1000, 'HUF', 1)",
    )
    .execute(&mut conn)
    .expect("Failed to insert price");

    // A second active price for the same key must fail
    let duplicate_active = diesel::sql_query(
        "INSERT INTO service_prices
         (network_id, service_package_id, vehicle_type, price, currency, is_active)
         VALUES (904, 1, 'tractor', 1200, 'HUF', 1)",
    )
    .execute(&mut conn);
    assert!(
        duplicate_active.is_err(),
        "Second active price for the same key should fail due to UNIQUE constraint"
    );

    // Inactive rows for the same key are allowed (price history)
    diesel::sql_query(
        "INSERT INTO service_prices
         (network_id, service_package_id, vehicle_type, price, currency, is_active)
         VALUES (904, 1, 'tractor', 900, 'HUF', 0)",
    )
    .execute(&mut conn)
    .expect("Inactive price rows must not trip the active-key guard");
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_transaction_rollback() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    // Begin transaction
    conn.begin_test_transaction()
        .expect("Failed to begin transaction");

    diesel::sql_query(
        "INSERT INTO partner_companies (network_id, code, name, billing_type, is_active)
         VALUES (905, 'ROLLBACK-01', 'Rollback Kft.', 'cash', 1)",
    )
    .execute(&mut conn)
    .expect("Failed to insert partner");

    // Verify the partner exists within the transaction
    let count: i64 = diesel::sql_query(
        "SELECT COUNT(*) as count FROM partner_companies WHERE code = 'ROLLBACK-01'",
    )
    .get_result::<CountResult>(&mut conn)
    .map(|r| r.count)
    .expect("Failed to count partners");

    assert_eq!(count, 1, "Partner should exist within transaction");

    // Transaction will rollback when conn is dropped (test transaction mode)
    drop(conn);

    // Reconnect and verify rollback
    let mut new_conn = mysql::initialize_database(&url).expect("Failed to reconnect to MariaDB");

    let count_after: i64 = diesel::sql_query(
        "SELECT COUNT(*) as count FROM partner_companies WHERE code = 'ROLLBACK-01'",
    )
    .get_result::<CountResult>(&mut new_conn)
    .map(|r| r.count)
    .expect("Failed to count partners after rollback");

    assert_eq!(
        count_after, 0,
        "Partner should not exist after transaction rollback"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_wash_status_check_constraint() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    diesel::sql_query(
        "INSERT INTO locations (network_id, code, operation_type, is_active)
         VALUES (906, 'CHECK-01', 'own', 1)",
    )
    .execute(&mut conn)
    .expect("Failed to insert location");

    let location_id: i64 = diesel::sql_query("SELECT LAST_INSERT_ID() as id")
        .get_result::<LastInsertIdResult>(&mut conn)
        .map(|r| r.id)
        .expect("Failed to get location_id");

    // An out-of-vocabulary status must be rejected by the CHECK constraint
    let result = diesel::sql_query(format!(
        "INSERT INTO wash_events
         (network_id, location_id, entry_mode, service_package_id, vehicle_type, status, created_at)
         VALUES (906, {location_id}, 'manual_operator', 1, 'tractor', 'vanished', '2026-01-12T10:30:00Z')"
    ))
    .execute(&mut conn);

    assert!(
        result.is_err(),
        "Unknown wash status should fail due to CHECK constraint"
    );
}
