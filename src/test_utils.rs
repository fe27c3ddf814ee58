//! Shared test utilities for the budget ledger.
//!
//! This module provides common helper functions for setting up test databases,
//! seeding a small directory, recording transactions by name and building
//! in-memory models for the pure report functions.
#![allow(clippy::expect_used)]

use crate::{
    core::{
        directory,
        ledger::{self, NewTransaction},
    },
    entities::{CategoryType, category, currency, plan, subcategory, transaction, wallet},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a valid calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Creates a category with the given type.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
    category_type: CategoryType,
) -> Result<category::Model> {
    directory::create_category(db, name, category_type).await
}

/// Creates a wallet with the given name.
pub async fn create_wallet_named(db: &DatabaseConnection, name: &str) -> Result<wallet::Model> {
    directory::create_wallet(db, name).await
}

/// A database with a small directory already in place.
pub struct DirectoryFixture {
    /// Database connection
    pub db: DatabaseConnection,
    /// "Food", expense
    pub food: category::Model,
    /// "Salary", income
    pub salary: category::Model,
    /// "Groceries" under "Food"
    pub groceries: subcategory::Model,
    /// "EUR"
    pub currency: currency::Model,
    /// "Cash"
    pub cash: wallet::Model,
}

/// Sets up a test database with:
/// * categories `Food` (expense, subcategory `Groceries`) and `Salary` (income)
/// * currency `EUR`
/// * wallet `Cash`
pub async fn setup_directory() -> Result<DirectoryFixture> {
    let db = setup_test_db().await?;
    let food = create_test_category(&db, "Food", CategoryType::Expense).await?;
    let salary = create_test_category(&db, "Salary", CategoryType::Income).await?;
    let groceries = directory::create_subcategory(&db, food.id, "Groceries").await?;
    let currency = directory::create_currency(&db, "EUR", "Euro").await?;
    let cash = create_wallet_named(&db, "Cash").await?;
    Ok(DirectoryFixture {
        db,
        food,
        salary,
        groceries,
        currency,
        cash,
    })
}

/// A ledger entry in `EUR` from the `Cash` wallet, without subcategory or comment.
pub fn new_entry(day: NaiveDate, category_name: &str, amount: &str) -> NewTransaction {
    NewTransaction {
        date: day,
        category_name: category_name.to_string(),
        subcategory_name: None,
        amount: amount.to_string(),
        currency_code: "EUR".to_string(),
        wallet_name: "Cash".to_string(),
        comment: None,
    }
}

/// Records a transaction built by [`new_entry`].
pub async fn record(
    db: &DatabaseConnection,
    day: NaiveDate,
    category_name: &str,
    amount: &str,
) -> Result<transaction::Model> {
    ledger::create_transaction(db, new_entry(day, category_name, amount)).await
}

/// Records a transaction from a specific wallet.
pub async fn record_in_wallet(
    db: &DatabaseConnection,
    day: NaiveDate,
    category_name: &str,
    amount: &str,
    wallet_name: &str,
) -> Result<transaction::Model> {
    let entry = NewTransaction {
        wallet_name: wallet_name.to_string(),
        ..new_entry(day, category_name, amount)
    };
    ledger::create_transaction(db, entry).await
}

/// In-memory category row.
pub fn category_model(id: i64, name: &str, category_type: CategoryType) -> category::Model {
    category::Model {
        id,
        name: name.to_string(),
        category_type,
    }
}

/// In-memory wallet row.
pub fn wallet_model(id: i64, name: &str) -> wallet::Model {
    wallet::Model {
        id,
        name: name.to_string(),
    }
}

/// In-memory plan row.
pub fn plan_model(id: i64, category_id: i64, amount: f64, month: i32, year: i32) -> plan::Model {
    plan::Model {
        id,
        category_id,
        amount,
        month,
        year,
    }
}

/// In-memory transaction row in currency 1, without subcategory or comment.
pub fn transaction_model(
    id: i64,
    day: NaiveDate,
    category_id: i64,
    wallet_id: i64,
    amount: f64,
) -> transaction::Model {
    transaction::Model {
        id,
        date: day,
        category_id,
        subcategory_id: None,
        amount,
        currency_id: 1,
        wallet_id,
        comment: None,
    }
}
