//! Plan business logic - the sparse per-category monthly budget table.
//!
//! A plan row is created lazily the first time a budget is set for a
//! (category, month, year) key and overwritten in place afterwards.
//! [`upsert_plan`] performs that insert-or-update as a single conditional write
//! against the unique plan key index, inside one database transaction, so two
//! concurrent edits of the same key can never produce two rows.

use crate::{
    core::{
        directory,
        period::{Period, parse_amount},
    },
    entities::{Plan, plan},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, QueryOrder, Select, Set, TransactionTrait, prelude::*, sea_query::OnConflict,
};
use tracing::{info, instrument};

fn by_key(category_id: i64, period: Period) -> Select<Plan> {
    Plan::find()
        .filter(plan::Column::CategoryId.eq(category_id))
        .filter(plan::Column::Month.eq(period.month_column()))
        .filter(plan::Column::Year.eq(period.year()))
}

/// Looks up the plan for one category and period by its composite key.
pub async fn get_plan<C>(db: &C, category_id: i64, period: Period) -> Result<Option<plan::Model>>
where
    C: ConnectionTrait,
{
    by_key(category_id, period)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All plans of one period, ordered by category id.
pub async fn plans_for_period<C>(db: &C, period: Period) -> Result<Vec<plan::Model>>
where
    C: ConnectionTrait,
{
    Plan::find()
        .filter(plan::Column::Month.eq(period.month_column()))
        .filter(plan::Column::Year.eq(period.year()))
        .order_by_asc(plan::Column::CategoryId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets the budget of `category_name` for (`month`, `year`) to the amount in
/// `raw_amount`, inserting the plan row if it does not exist yet.
///
/// Validation happens before anything touches the plan table:
/// 1. `raw_amount` must parse as a finite number
/// 2. `month` must be in 1..=12
/// 3. `category_name` must match a category exactly
///
/// The write is `INSERT .. ON CONFLICT (category_id, plan_month, plan_year) DO UPDATE`,
/// and the stored row is read back within the same transaction.
///
/// # Errors
/// - [`Error::InvalidInput`] for an unparseable amount or an invalid month
/// - [`Error::NotFound`] when the category does not exist
/// - [`Error::Database`] on storage failure
#[instrument(skip(db))]
pub async fn upsert_plan(
    db: &DatabaseConnection,
    category_name: &str,
    month: u32,
    year: i32,
    raw_amount: &str,
) -> Result<plan::Model> {
    let amount = parse_amount(raw_amount)?;
    let period = Period::new(month, year)?;

    let txn = db.begin().await?;

    let category_id = directory::resolve_category_id(&txn, category_name).await?;

    let row = plan::ActiveModel {
        category_id: Set(category_id),
        amount: Set(amount),
        month: Set(period.month_column()),
        year: Set(period.year()),
        ..Default::default()
    };

    Plan::insert(row)
        .on_conflict(
            OnConflict::columns([
                plan::Column::CategoryId,
                plan::Column::Month,
                plan::Column::Year,
            ])
            .update_column(plan::Column::Amount)
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let stored = by_key(category_id, period)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("plan", format!("{category_name} {period}")))?;

    txn.commit().await?;

    info!(plan_id = stored.id, amount, "Plan saved");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::CategoryType;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    async fn plan_rows(db: &DatabaseConnection) -> Result<u64> {
        Plan::find().count(db).await.map_err(Into::into)
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates_in_place() -> Result<()> {
        let db = setup_test_db().await?;
        let food = create_test_category(&db, "Food", CategoryType::Expense).await?;

        let first = upsert_plan(&db, "Food", 3, 2024, "200").await?;
        assert_eq!(first.amount, 200.0);
        assert_eq!(first.category_id, food.id);
        assert_eq!((first.month, first.year), (3, 2024));

        let second = upsert_plan(&db, "Food", 3, 2024, "350.5").await?;
        assert_eq!(second.id, first.id);
        assert_eq!(second.amount, 350.5);

        assert_eq!(plan_rows(&db).await?, 1);
        let stored = get_plan(&db, food.id, Period::new(3, 2024)?).await?.unwrap();
        assert_eq!(stored.amount, 350.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_keys_are_independent() -> Result<()> {
        let db = setup_test_db().await?;
        let food = create_test_category(&db, "Food", CategoryType::Expense).await?;
        let rent = create_test_category(&db, "Rent", CategoryType::Expense).await?;

        upsert_plan(&db, "Food", 3, 2024, "200").await?;
        upsert_plan(&db, "Food", 4, 2024, "210").await?;
        upsert_plan(&db, "Food", 3, 2025, "220").await?;
        upsert_plan(&db, "Rent", 3, 2024, "900").await?;

        assert_eq!(plan_rows(&db).await?, 4);

        let march = plans_for_period(&db, Period::new(3, 2024)?).await?;
        let pairs: Vec<_> = march.iter().map(|p| (p.category_id, p.amount)).collect();
        assert_eq!(pairs, [(food.id, 200.0), (rent.id, 900.0)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_amount_without_writing() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "Food", CategoryType::Expense).await?;

        for raw in ["", "abc", "12,5", "NaN", "infinity"] {
            let result = upsert_plan(&db, "Food", 3, 2024, raw).await;
            assert!(
                matches!(result, Err(Error::InvalidInput { .. })),
                "expected InvalidInput for {raw:?}"
            );
        }
        assert_eq!(plan_rows(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_rejects_unknown_category_and_bad_month() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "Food", CategoryType::Expense).await?;

        let unknown = upsert_plan(&db, "food", 3, 2024, "10").await;
        assert!(matches!(unknown, Err(Error::NotFound { kind: "category", .. })));

        let bad_month = upsert_plan(&db, "Food", 13, 2024, "10").await;
        assert!(matches!(bad_month, Err(Error::InvalidInput { .. })));

        assert_eq!(plan_rows(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_upserts_leave_one_row() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "Food", CategoryType::Expense).await?;

        let (a, b, c) = tokio::join!(
            upsert_plan(&db, "Food", 3, 2024, "100"),
            upsert_plan(&db, "Food", 3, 2024, "200"),
            upsert_plan(&db, "Food", 3, 2024, "300"),
        );
        a?;
        b?;
        c?;

        assert_eq!(plan_rows(&db).await?, 1);
        Ok(())
    }
}
