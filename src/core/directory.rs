//! Directory business logic - name↔id resolution and management of categories,
//! subcategories, currencies and wallets.
//!
//! Resolution is done against a [`DirectorySnapshot`] loaded once per call site, so
//! reports never issue one lookup query per row. Name lookups are exact and
//! case-sensitive. Reverse lookups used for display degrade to an empty string.

use crate::{
    entities::{
        Category, CategoryType, Currency, Subcategory, Wallet, category, currency, subcategory,
        wallet,
    },
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Point-in-time copy of all directory tables.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    categories: Vec<category::Model>,
    subcategories: Vec<subcategory::Model>,
    currencies: Vec<currency::Model>,
    wallets: Vec<wallet::Model>,
    category_index: HashMap<i64, usize>,
}

impl DirectorySnapshot {
    /// Builds a snapshot from already loaded rows. Categories are kept ordered by name.
    #[must_use]
    pub fn new(
        mut categories: Vec<category::Model>,
        subcategories: Vec<subcategory::Model>,
        currencies: Vec<currency::Model>,
        wallets: Vec<wallet::Model>,
    ) -> Self {
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        let category_index = categories
            .iter()
            .enumerate()
            .map(|(position, c)| (c.id, position))
            .collect();
        Self {
            categories,
            subcategories,
            currencies,
            wallets,
            category_index,
        }
    }

    /// All categories, ordered by name.
    #[must_use]
    pub fn categories(&self) -> &[category::Model] {
        &self.categories
    }

    /// Categories of one type, ordered by name.
    pub fn categories_of_type(
        &self,
        category_type: CategoryType,
    ) -> impl Iterator<Item = &category::Model> {
        self.categories
            .iter()
            .filter(move |c| c.category_type == category_type)
    }

    /// Category by id.
    #[must_use]
    pub fn category(&self, id: i64) -> Option<&category::Model> {
        self.category_index
            .get(&id)
            .and_then(|&position| self.categories.get(position))
    }

    /// Resolves a category name to its id.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] when no category has exactly this name.
    pub fn resolve_category_id(&self, name: &str) -> Result<i64> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
            .ok_or_else(|| Error::not_found("category", name))
    }

    /// Resolves a subcategory name to its id.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] when no subcategory has exactly this name.
    pub fn resolve_subcategory_id(&self, name: &str) -> Result<i64> {
        self.subcategories
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.id)
            .ok_or_else(|| Error::not_found("subcategory", name))
    }

    /// Resolves a currency code to its id.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] when no currency has exactly this code.
    pub fn resolve_currency_id(&self, code: &str) -> Result<i64> {
        self.currencies
            .iter()
            .find(|c| c.code == code)
            .map(|c| c.id)
            .ok_or_else(|| Error::not_found("currency", code))
    }

    /// Resolves a wallet name to its id.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] when no wallet has exactly this name.
    pub fn resolve_wallet_id(&self, name: &str) -> Result<i64> {
        self.wallets
            .iter()
            .find(|w| w.name == name)
            .map(|w| w.id)
            .ok_or_else(|| Error::not_found("wallet", name))
    }

    /// Category name for display, empty when unknown.
    #[must_use]
    pub fn category_name(&self, id: i64) -> &str {
        self.category(id).map_or("", |c| c.name.as_str())
    }

    /// Subcategory name for display, empty when unknown or absent.
    #[must_use]
    pub fn subcategory_name(&self, id: Option<i64>) -> &str {
        id.and_then(|id| self.subcategories.iter().find(|s| s.id == id))
            .map_or("", |s| s.name.as_str())
    }

    /// Currency code for display, empty when unknown.
    #[must_use]
    pub fn currency_code(&self, id: i64) -> &str {
        self.currencies
            .iter()
            .find(|c| c.id == id)
            .map_or("", |c| c.code.as_str())
    }

    /// Wallet name for display, empty when unknown.
    #[must_use]
    pub fn wallet_name(&self, id: i64) -> &str {
        self.wallets
            .iter()
            .find(|w| w.id == id)
            .map_or("", |w| w.name.as_str())
    }

    /// Whether the category has no subcategories and may be deleted.
    #[must_use]
    pub fn can_delete_category(&self, id: i64) -> bool {
        !self.subcategories.iter().any(|s| s.category_id == id)
    }
}

/// Loads the whole directory with one query per table.
///
/// Accepts any connection, so it can run inside a report's read transaction.
pub async fn load_snapshot<C>(db: &C) -> Result<DirectorySnapshot>
where
    C: ConnectionTrait,
{
    let categories = Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;
    let subcategories = Subcategory::find()
        .order_by_asc(subcategory::Column::Name)
        .all(db)
        .await?;
    let currencies = Currency::find()
        .order_by_asc(currency::Column::Code)
        .all(db)
        .await?;
    let wallets = Wallet::find()
        .order_by_asc(wallet::Column::Name)
        .all(db)
        .await?;

    Ok(DirectorySnapshot::new(
        categories,
        subcategories,
        currencies,
        wallets,
    ))
}

/// Resolves a single category name without loading a full snapshot.
///
/// # Errors
/// Returns [`Error::NotFound`] when no category has exactly this name.
pub async fn resolve_category_id<C>(db: &C, name: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    get_category_by_name(db, name)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| Error::not_found("category", name))
}

/// Resolves a single subcategory name.
pub async fn resolve_subcategory_id<C>(db: &C, name: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    Subcategory::find()
        .filter(subcategory::Column::Name.eq(name))
        .one(db)
        .await?
        .map(|s| s.id)
        .ok_or_else(|| Error::not_found("subcategory", name))
}

/// Resolves a single currency code.
pub async fn resolve_currency_id<C>(db: &C, code: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    Currency::find()
        .filter(currency::Column::Code.eq(code))
        .one(db)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| Error::not_found("currency", code))
}

/// Resolves a single wallet name.
pub async fn resolve_wallet_id<C>(db: &C, name: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    Wallet::find()
        .filter(wallet::Column::Name.eq(name))
        .one(db)
        .await?
        .map(|w| w.id)
        .ok_or_else(|| Error::not_found("wallet", name))
}

/// Finds a category by its exact name.
pub async fn get_category_by_name<C>(db: &C, name: &str) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all categories ordered by name.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

fn validated_name(name: &str, what: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input(format!("{what} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Creates a category.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for an empty name and [`Error::Conflict`] when a
/// category with the same name exists.
#[instrument(skip(db))]
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    category_type: CategoryType,
) -> Result<category::Model> {
    let name = validated_name(name, "Category name")?;
    if get_category_by_name(db, &name).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("category '{name}' already exists"),
        });
    }

    let created = category::ActiveModel {
        name: Set(name),
        category_type: Set(category_type),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(id = created.id, "Created category");
    Ok(created)
}

/// Renames a category and/or changes its type.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown id and [`Error::Conflict`] when the new
/// name belongs to another category.
#[instrument(skip(db))]
pub async fn update_category(
    db: &DatabaseConnection,
    id: i64,
    name: &str,
    category_type: CategoryType,
) -> Result<category::Model> {
    let name = validated_name(name, "Category name")?;
    let existing = Category::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("category", id.to_string()))?;

    let clash = get_category_by_name(db, &name).await?;
    if clash.is_some_and(|other| other.id != id) {
        return Err(Error::Conflict {
            message: format!("category '{name}' already exists"),
        });
    }

    let mut active_model: category::ActiveModel = existing.into();
    active_model.name = Set(name);
    active_model.category_type = Set(category_type);
    active_model.update(db).await.map_err(Into::into)
}

/// Whether a category has no subcategories and may be deleted.
pub async fn can_delete_category<C>(db: &C, id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let dependents = Subcategory::find()
        .filter(subcategory::Column::CategoryId.eq(id))
        .count(db)
        .await?;
    Ok(dependents == 0)
}

/// Deletes a category that has no subcategories.
///
/// Transactions or plans still pointing at the category make the storage layer
/// reject the delete, which surfaces as [`Error::Database`].
///
/// # Errors
/// Returns [`Error::Conflict`] while subcategories reference the category and
/// [`Error::NotFound`] for an unknown id.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, id: i64) -> Result<()> {
    let txn = db.begin().await?;

    if !can_delete_category(&txn, id).await? {
        return Err(Error::Conflict {
            message: "category has subcategories, delete them first".to_string(),
        });
    }

    let result = Category::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("category", id.to_string()));
    }

    txn.commit().await?;
    info!("Deleted category");
    Ok(())
}

/// Lists the subcategories of a category ordered by name.
pub async fn list_subcategories(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Vec<subcategory::Model>> {
    Subcategory::find()
        .filter(subcategory::Column::CategoryId.eq(category_id))
        .order_by_asc(subcategory::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a subcategory under an existing category.
#[instrument(skip(db))]
pub async fn create_subcategory(
    db: &DatabaseConnection,
    category_id: i64,
    name: &str,
) -> Result<subcategory::Model> {
    let name = validated_name(name, "Subcategory name")?;
    Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("category", category_id.to_string()))?;

    subcategory::ActiveModel {
        category_id: Set(category_id),
        name: Set(name),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Renames a subcategory.
#[instrument(skip(db))]
pub async fn rename_subcategory(
    db: &DatabaseConnection,
    id: i64,
    name: &str,
) -> Result<subcategory::Model> {
    let name = validated_name(name, "Subcategory name")?;
    let existing = Subcategory::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("subcategory", id.to_string()))?;

    let mut active_model: subcategory::ActiveModel = existing.into();
    active_model.name = Set(name);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a subcategory.
#[instrument(skip(db))]
pub async fn delete_subcategory(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Subcategory::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("subcategory", id.to_string()));
    }
    Ok(())
}

/// Lists currencies ordered by code.
pub async fn list_currencies(db: &DatabaseConnection) -> Result<Vec<currency::Model>> {
    Currency::find()
        .order_by_asc(currency::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a currency. Both code and name are required.
#[instrument(skip(db))]
pub async fn create_currency(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
) -> Result<currency::Model> {
    let code = validated_name(code, "Currency code")?;
    let name = validated_name(name, "Currency name")?;

    currency::ActiveModel {
        code: Set(code),
        name: Set(name),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Deletes a currency.
#[instrument(skip(db))]
pub async fn delete_currency(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Currency::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("currency", id.to_string()));
    }
    Ok(())
}

/// Lists wallets ordered by name.
pub async fn list_wallets(db: &DatabaseConnection) -> Result<Vec<wallet::Model>> {
    Wallet::find()
        .order_by_asc(wallet::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a wallet.
#[instrument(skip(db))]
pub async fn create_wallet(db: &DatabaseConnection, name: &str) -> Result<wallet::Model> {
    let name = validated_name(name, "Wallet name")?;

    wallet::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Deletes a wallet.
#[instrument(skip(db))]
pub async fn delete_wallet(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Wallet::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("wallet", id.to_string()));
    }
    Ok(())
}
