//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test accounts with sensible defaults.

use crate::{
    core::account::{NewAccount, create_account},
    entities::account,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Password given to every account created by these helpers
pub const TEST_PASSWORD: &str = "test-password";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a plain user account with [`TEST_PASSWORD`] and no phone.
pub async fn create_test_account(
    db: &DatabaseConnection,
    holder: &str,
    balance: i64,
) -> Result<account::Model> {
    create_account(db, NewAccount::user(holder, TEST_PASSWORD, balance)).await
}

/// Creates a zero-balance user account with a phone number.
pub async fn create_test_account_with_phone(
    db: &DatabaseConnection,
    holder: &str,
    phone: &str,
) -> Result<account::Model> {
    let mut new_account = NewAccount::user(holder, TEST_PASSWORD, 0);
    new_account.phone = Some(phone.to_string());
    create_account(db, new_account).await
}

/// Creates an admin account with [`TEST_PASSWORD`].
pub async fn create_test_admin(db: &DatabaseConnection, holder: &str) -> Result<account::Model> {
    let mut new_account = NewAccount::user(holder, TEST_PASSWORD, 0);
    new_account.role = account::Role::Admin;
    create_account(db, new_account).await
}

/// Sets up a database with two accounts, "alice" and "bob", holding the given balances.
/// Returns (db, alice, bob) for common transfer scenarios.
pub async fn setup_with_two_accounts(
    alice_balance: i64,
    bob_balance: i64,
) -> Result<(DatabaseConnection, account::Model, account::Model)> {
    let db = setup_test_db().await?;
    let alice = create_test_account(&db, "alice", alice_balance).await?;
    let bob = create_test_account(&db, "bob", bob_balance).await?;
    Ok((db, alice, bob))
}
