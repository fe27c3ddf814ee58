//! Ledger business logic - Handles transaction entry, deletion and retrieval.
//!
//! Transactions are entered by directory names (category, currency, wallet) which are
//! resolved to ids before anything is written. Retrieval and sums take a
//! [`TransactionFilter`] that is turned into bound predicates; a category or wallet
//! name that resolves to nothing selects no rows.

use crate::{
    core::{
        directory::{self, DirectorySnapshot},
        period::{DateRange, TransactionFilter, parse_amount},
    },
    entities::transaction,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    Condition, ConnectionTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use tracing::{debug, info, instrument};

/// User-entered data for a new ledger entry.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Date of the transaction
    pub date: NaiveDate,
    /// Exact category name
    pub category_name: String,
    /// Optional subcategory name; empty means none
    pub subcategory_name: Option<String>,
    /// Amount as typed by the user
    pub amount: String,
    /// Currency code
    pub currency_code: String,
    /// Exact wallet name
    pub wallet_name: String,
    /// Optional comment; blank means none
    pub comment: Option<String>,
}

/// Filter criteria with category and wallet names turned into ids.
///
/// Built once per query from a [`DirectorySnapshot`]; the same ids back both the
/// SQL predicate and the in-memory match used on loaded snapshots.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedFilter {
    range: DateRange,
    category_id: Option<i64>,
    wallet_id: Option<i64>,
}

impl ResolvedFilter {
    /// `None` when a named category or wallet does not exist, meaning the filter
    /// cannot match any transaction.
    pub(crate) fn resolve(filter: &TransactionFilter, directory: &DirectorySnapshot) -> Option<Self> {
        let category_id = match filter.category() {
            Some(name) => Some(directory.resolve_category_id(name).ok()?),
            None => None,
        };
        let wallet_id = match filter.wallet() {
            Some(name) => Some(directory.resolve_wallet_id(name).ok()?),
            None => None,
        };
        Some(Self {
            range: filter.date_range,
            category_id,
            wallet_id,
        })
    }

    /// Bound query predicate.
    pub(crate) fn condition(&self) -> Condition {
        Condition::all()
            .add_option(
                self.range
                    .start
                    .map(|start| transaction::Column::Date.gte(start)),
            )
            .add_option(self.range.end.map(|end| transaction::Column::Date.lte(end)))
            .add_option(
                self.category_id
                    .map(|id| transaction::Column::CategoryId.eq(id)),
            )
            .add_option(self.wallet_id.map(|id| transaction::Column::WalletId.eq(id)))
    }

    /// Whether an already loaded transaction satisfies the filter.
    pub(crate) fn matches(&self, t: &transaction::Model) -> bool {
        self.range.contains(t.date)
            && self.category_id.is_none_or(|id| t.category_id == id)
            && self.wallet_id.is_none_or(|id| t.wallet_id == id)
    }
}

async fn resolve_filter<C>(db: &C, filter: &TransactionFilter) -> Result<Option<ResolvedFilter>>
where
    C: ConnectionTrait,
{
    let directory = directory::load_snapshot(db).await?;
    Ok(ResolvedFilter::resolve(filter, &directory))
}

/// Records a new transaction after validating the amount and resolving every name.
///
/// Nothing is written when any step fails.
///
/// # Errors
/// - [`Error::InvalidInput`] when the amount is not a finite number
/// - [`Error::NotFound`] when the category, subcategory, currency or wallet is unknown
#[instrument(skip(db, entry), fields(category = %entry.category_name, date = %entry.date))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    entry: NewTransaction,
) -> Result<transaction::Model> {
    let amount = parse_amount(&entry.amount)?;

    let txn = db.begin().await?;

    let category_id = directory::resolve_category_id(&txn, &entry.category_name).await?;
    let subcategory_id = match entry.subcategory_name.as_deref() {
        Some(name) if !name.is_empty() => {
            Some(directory::resolve_subcategory_id(&txn, name).await?)
        }
        _ => None,
    };
    let currency_id = directory::resolve_currency_id(&txn, &entry.currency_code).await?;
    let wallet_id = directory::resolve_wallet_id(&txn, &entry.wallet_name).await?;
    let comment = entry
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let created = transaction::ActiveModel {
        date: Set(entry.date),
        category_id: Set(category_id),
        subcategory_id: Set(subcategory_id),
        amount: Set(amount),
        currency_id: Set(currency_id),
        wallet_id: Set(wallet_id),
        comment: Set(comment),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(id = created.id, amount, "Recorded transaction");
    Ok(created)
}

/// Deletes a transaction by id.
///
/// # Errors
/// Returns [`Error::NotFound`] when no transaction has this id.
#[instrument(skip(db))]
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: i64) -> Result<()> {
    let result = transaction::Entity::delete_by_id(transaction_id)
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("transaction", transaction_id.to_string()));
    }
    info!("Deleted transaction");
    Ok(())
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    transaction::Entity::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the transactions matching `filter`, newest first.
///
/// A category or wallet name that matches nothing selects no rows; the criterion
/// is not dropped. Empty names mean no criterion.
pub async fn list_transactions<C>(
    db: &C,
    filter: &TransactionFilter,
) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    let Some(resolved) = resolve_filter(db, filter).await? else {
        debug!("Filter names an unknown category or wallet, nothing matches");
        return Ok(Vec::new());
    };

    transaction::Entity::find()
        .filter(resolved.condition())
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sums the amounts of the transactions matching `filter`; 0 when none match.
///
/// Unknown category or wallet names select nothing, as in [`list_transactions`].
pub async fn sum_amounts<C>(db: &C, filter: &TransactionFilter) -> Result<f64>
where
    C: ConnectionTrait,
{
    let Some(resolved) = resolve_filter(db, filter).await? else {
        return Ok(0.0);
    };

    let total: Option<Option<f64>> = transaction::Entity::find()
        .select_only()
        .column_as(Expr::col(transaction::Column::Amount).sum(), "total")
        .filter(resolved.condition())
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0.0))
}
