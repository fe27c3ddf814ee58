//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The one constraint the entity macros
//! cannot express, uniqueness of a plan per (category, month, year), is added here as a
//! separate unique index.

use crate::entities::{Category, Currency, Plan, Subcategory, Transaction, Wallet, plan};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://budget_ledger.sqlite?mode=rwc";

/// Name of the unique index backing the plan upsert.
pub const PLAN_KEY_INDEX: &str = "idx_plans_category_month_year";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns
/// the default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    connect(&get_database_url()).await
}

/// Establishes a connection to the given database URL.
#[instrument]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables (if missing) plus the unique plan key index.
///
/// Parent tables are created before the tables holding foreign keys to them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Category).await?;
    create_table(db, &schema, Subcategory).await?;
    create_table(db, &schema, Currency).await?;
    create_table(db, &schema, Wallet).await?;
    create_table(db, &schema, Transaction).await?;
    create_table(db, &schema, Plan).await?;

    let plan_key = Index::create()
        .name(PLAN_KEY_INDEX)
        .table(Plan)
        .col(plan::Column::CategoryId)
        .col(plan::Column::Month)
        .col(plan::Column::Year)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&plan_key)).await?;

    info!("Database tables ensured");
    Ok(())
}
