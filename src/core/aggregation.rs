//! Report aggregation - plan vs. actual summaries, category distributions and
//! monthly income/expense dynamics.
//!
//! Every report is computed in two steps. A [`LedgerSnapshot`] is loaded inside one
//! read transaction (directory, the transactions in scope and, for period reports,
//! the plans of the period), then a pure function turns the snapshot into report
//! rows. Any storage failure while loading fails the whole report; there are no
//! partially populated results.
//!
//! Inclusion rules differ per report:
//! - the period summary lists every expense category, with zero plan/actual when
//!   nothing is stored (left outer join)
//! - the distributions list only expense categories with at least one matching
//!   transaction (inner join)
//! - the monthly dynamics include both income and expense categories

use crate::{
    core::{
        directory::{self, DirectorySnapshot},
        ledger::ResolvedFilter,
        period::{Period, TransactionFilter},
        plan::plans_for_period,
    },
    entities::{CategoryType, plan, transaction},
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Label of the synthetic totals row.
pub const TOTAL_LABEL: &str = "TOTAL";

/// Everything a report needs, read at one point in time.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// Categories, subcategories, currencies and wallets
    pub directory: DirectorySnapshot,
    /// Transactions in the loaded scope
    pub transactions: Vec<transaction::Model>,
    /// Plans in the loaded scope
    pub plans: Vec<plan::Model>,
}

/// Plan, actual and deviation of one category (or of the totals row).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Category name, or [`TOTAL_LABEL`]
    pub category: String,
    /// Budgeted amount, 0 without a plan
    pub plan: f64,
    /// Sum of the period's transactions
    pub actual: f64,
    /// `plan - actual`
    pub deviation: f64,
}

impl SummaryRow {
    fn new(category: impl Into<String>, plan: f64, actual: f64) -> Self {
        Self {
            category: category.into(),
            plan,
            actual,
            deviation: plan - actual,
        }
    }
}

/// Plan vs. actual for every expense category in one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// The summarized period
    pub period: Period,
    /// One row per expense category, ordered by category name
    pub rows: Vec<SummaryRow>,
    /// Sums over `rows`
    pub total: SummaryRow,
}

impl PeriodSummary {
    /// Category rows followed by the totals row, as displayed in the summary table.
    #[must_use]
    pub fn rows_with_total(&self) -> Vec<SummaryRow> {
        let mut rows = self.rows.clone();
        rows.push(self.total.clone());
        rows
    }

    /// Parallel (category, plan) and (category, actual) series for the bar chart.
    #[must_use]
    pub fn plan_actual_series(&self) -> (Vec<(String, f64)>, Vec<(String, f64)>) {
        self.rows
            .iter()
            .map(|row| {
                (
                    (row.category.clone(), row.plan),
                    (row.category.clone(), row.actual),
                )
            })
            .unzip()
    }
}

/// Total actual amount of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Category name
    pub category: String,
    /// Sum of matching transaction amounts
    pub total: f64,
}

/// Income and expense totals of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub label: String,
    /// Sum over expense categories
    pub expense: f64,
    /// Sum over income categories
    pub income: f64,
}

/// Monthly income/expense buckets, ascending by month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyDynamics {
    /// Only months with at least one transaction appear
    pub points: Vec<MonthlyPoint>,
}

impl MonthlyDynamics {
    /// `(label, expense)` series.
    #[must_use]
    pub fn expense_series(&self) -> Vec<(String, f64)> {
        self.points
            .iter()
            .map(|p| (p.label.clone(), p.expense))
            .collect()
    }

    /// `(label, income)` series.
    #[must_use]
    pub fn income_series(&self) -> Vec<(String, f64)> {
        self.points
            .iter()
            .map(|p| (p.label.clone(), p.income))
            .collect()
    }
}

/// Plan vs. actual for every expense category in `period`, plus a totals row.
#[must_use]
pub fn period_summary(snapshot: &LedgerSnapshot, period: Period) -> PeriodSummary {
    let mut actuals: HashMap<i64, f64> = HashMap::new();
    for t in snapshot
        .transactions
        .iter()
        .filter(|t| period.contains(t.date))
    {
        *actuals.entry(t.category_id).or_insert(0.0) += t.amount;
    }

    let plans: HashMap<i64, f64> = snapshot
        .plans
        .iter()
        .filter(|p| p.month == period.month_column() && p.year == period.year())
        .map(|p| (p.category_id, p.amount))
        .collect();

    let rows: Vec<SummaryRow> = snapshot
        .directory
        .categories_of_type(CategoryType::Expense)
        .map(|c| {
            SummaryRow::new(
                c.name.clone(),
                plans.get(&c.id).copied().unwrap_or(0.0),
                actuals.get(&c.id).copied().unwrap_or(0.0),
            )
        })
        .collect();

    let total_plan: f64 = rows.iter().map(|r| r.plan).sum();
    let total_actual: f64 = rows.iter().map(|r| r.actual).sum();

    PeriodSummary {
        period,
        rows,
        total: SummaryRow::new(TOTAL_LABEL, total_plan, total_actual),
    }
}

/// Sums matching transactions per expense category, keeping only categories
/// that have at least one match. Ordered by category name.
fn expense_totals<'a>(
    directory: &DirectorySnapshot,
    transactions: impl Iterator<Item = &'a transaction::Model>,
) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for t in transactions {
        let Some(category) = directory.category(t.category_id) else {
            continue;
        };
        if category.category_type == CategoryType::Expense {
            *totals.entry(category.name.as_str()).or_insert(0.0) += t.amount;
        }
    }

    totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect()
}

/// Expense totals per category for `period`; categories without transactions
/// in the period are omitted.
#[must_use]
pub fn category_distribution(snapshot: &LedgerSnapshot, period: Period) -> Vec<CategoryTotal> {
    expense_totals(
        &snapshot.directory,
        snapshot
            .transactions
            .iter()
            .filter(|t| period.contains(t.date)),
    )
}

/// Expense totals per category over whatever `filter` selects; categories
/// without matching transactions are omitted.
///
/// The filter is checked per transaction, so `snapshot` may hold more rows than
/// it selects. [`load_filtered_snapshot`] narrows the load with the same ids.
#[must_use]
pub fn annual_distribution(
    snapshot: &LedgerSnapshot,
    filter: &TransactionFilter,
) -> Vec<CategoryTotal> {
    let Some(resolved) = ResolvedFilter::resolve(filter, &snapshot.directory) else {
        return Vec::new();
    };
    expense_totals(
        &snapshot.directory,
        snapshot.transactions.iter().filter(|t| resolved.matches(t)),
    )
}

/// Income and expense sums per (year, month) over whatever `filter` selects.
#[must_use]
pub fn monthly_dynamics(snapshot: &LedgerSnapshot, filter: &TransactionFilter) -> MonthlyDynamics {
    let Some(resolved) = ResolvedFilter::resolve(filter, &snapshot.directory) else {
        return MonthlyDynamics::default();
    };

    let mut buckets: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for t in snapshot.transactions.iter().filter(|t| resolved.matches(t)) {
        let Some(category) = snapshot.directory.category(t.category_id) else {
            continue;
        };
        let bucket = buckets
            .entry((t.date.year(), t.date.month()))
            .or_insert((0.0, 0.0));
        match category.category_type {
            CategoryType::Expense => bucket.0 += t.amount,
            CategoryType::Income => bucket.1 += t.amount,
        }
    }

    MonthlyDynamics {
        points: buckets
            .into_iter()
            .map(|((year, month), (expense, income))| MonthlyPoint {
                label: format!("{year:04}-{month:02}"),
                expense,
                income,
            })
            .collect(),
    }
}

/// Loads the directory, the transactions dated in `period` and the plans of
/// `period` in one read transaction.
pub async fn load_period_snapshot<C>(db: &C, period: Period) -> Result<LedgerSnapshot>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let directory = directory::load_snapshot(&txn).await?;
    let transactions = transaction::Entity::find()
        .filter(transaction::Column::Date.gte(period.first_day()))
        .filter(transaction::Column::Date.lt(period.next_first_day()))
        .order_by_asc(transaction::Column::Id)
        .all(&txn)
        .await?;
    let plans = plans_for_period(&txn, period).await?;

    txn.commit().await?;

    debug!(
        transactions = transactions.len(),
        plans = plans.len(),
        "Loaded period snapshot"
    );
    Ok(LedgerSnapshot {
        directory,
        transactions,
        plans,
    })
}

/// Loads the directory and the transactions selected by `filter` in one read
/// transaction. Plans are not loaded.
pub async fn load_filtered_snapshot<C>(db: &C, filter: &TransactionFilter) -> Result<LedgerSnapshot>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let directory = directory::load_snapshot(&txn).await?;
    let transactions = match ResolvedFilter::resolve(filter, &directory) {
        Some(resolved) => {
            transaction::Entity::find()
                .filter(resolved.condition())
                .order_by_asc(transaction::Column::Id)
                .all(&txn)
                .await?
        }
        None => Vec::new(),
    };

    txn.commit().await?;

    debug!(
        transactions = transactions.len(),
        "Loaded filtered snapshot"
    );
    Ok(LedgerSnapshot {
        directory,
        transactions,
        plans: Vec::new(),
    })
}

/// Loads a snapshot for (`month`, `year`) and computes the [`PeriodSummary`].
///
/// # Errors
/// [`crate::errors::Error::InvalidInput`] for an invalid month, or a storage error.
#[instrument(skip(db))]
pub async fn compute_period_summary<C>(db: &C, month: u32, year: i32) -> Result<PeriodSummary>
where
    C: TransactionTrait,
{
    let period = Period::new(month, year)?;
    let snapshot = load_period_snapshot(db, period).await?;
    Ok(period_summary(&snapshot, period))
}

/// Loads a snapshot for (`month`, `year`) and computes the expense distribution.
#[instrument(skip(db))]
pub async fn compute_category_distribution<C>(
    db: &C,
    month: u32,
    year: i32,
) -> Result<Vec<CategoryTotal>>
where
    C: TransactionTrait,
{
    let period = Period::new(month, year)?;
    let snapshot = load_period_snapshot(db, period).await?;
    Ok(category_distribution(&snapshot, period))
}

/// Expense distribution restricted to an optional wallet and inclusive date bounds.
#[instrument(skip(db))]
pub async fn compute_annual_distribution<C>(
    db: &C,
    wallet: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<CategoryTotal>>
where
    C: TransactionTrait,
{
    let filter = TransactionFilter::for_wallet_and_range(wallet, start, end);
    let snapshot = load_filtered_snapshot(db, &filter).await?;
    Ok(annual_distribution(&snapshot, &filter))
}

/// Monthly income/expense dynamics restricted to an optional wallet and inclusive
/// date bounds.
#[instrument(skip(db))]
pub async fn compute_monthly_dynamics<C>(
    db: &C,
    wallet: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<MonthlyDynamics>
where
    C: TransactionTrait,
{
    let filter = TransactionFilter::for_wallet_and_range(wallet, start, end);
    let snapshot = load_filtered_snapshot(db, &filter).await?;
    Ok(monthly_dynamics(&snapshot, &filter))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::plan::upsert_plan;
    use crate::entities::{CategoryModel, WalletModel};
    use crate::test_utils::*;

    fn tx(id: i64, day: NaiveDate, category_id: i64, amount: f64) -> transaction::Model {
        transaction_model(id, day, category_id, 1, amount)
    }

    fn scenario() -> LedgerSnapshot {
        // Food and Rent are expenses, Salary is income
        let categories: Vec<CategoryModel> = vec![
            category_model(1, "Food", CategoryType::Expense),
            category_model(2, "Salary", CategoryType::Income),
            category_model(3, "Rent", CategoryType::Expense),
        ];
        let wallets: Vec<WalletModel> = vec![wallet_model(1, "Cash"), wallet_model(2, "Card")];
        LedgerSnapshot {
            directory: DirectorySnapshot::new(categories, vec![], vec![], wallets),
            transactions: vec![
                tx(1, date(2024, 3, 2), 1, 100.0),
                tx(2, date(2024, 3, 20), 1, 50.0),
                tx(3, date(2024, 3, 25), 2, 2000.0),
                tx(4, date(2024, 2, 10), 3, 700.0),
            ],
            plans: vec![plan_model(1, 1, 200.0, 3, 2024)],
        }
    }

    #[test]
    fn test_period_summary_scenario() {
        let summary = period_summary(&scenario(), Period::new(3, 2024).unwrap());

        assert_eq!(
            summary.rows,
            vec![
                SummaryRow {
                    category: "Food".to_string(),
                    plan: 200.0,
                    actual: 150.0,
                    deviation: 50.0,
                },
                SummaryRow {
                    category: "Rent".to_string(),
                    plan: 0.0,
                    actual: 0.0,
                    deviation: 0.0,
                },
            ]
        );
        assert_eq!(summary.total.category, TOTAL_LABEL);
        assert_eq!(summary.total.plan, 200.0);
        assert_eq!(summary.total.actual, 150.0);
        assert_eq!(summary.total.deviation, 50.0);
        assert!(!summary.rows.iter().any(|r| r.category == "Salary"));
    }

    #[test]
    fn test_period_summary_totals_reconcile() {
        let mut snapshot = scenario();
        snapshot.plans.push(plan_model(2, 3, 900.0, 3, 2024));
        snapshot.transactions.push(tx(5, date(2024, 3, 1), 3, 950.0));

        let summary = period_summary(&snapshot, Period::new(3, 2024).unwrap());
        let plan_sum: f64 = summary.rows.iter().map(|r| r.plan).sum();
        let actual_sum: f64 = summary.rows.iter().map(|r| r.actual).sum();

        assert_eq!(summary.total.plan, plan_sum);
        assert_eq!(summary.total.actual, actual_sum);
        assert_eq!(
            summary.total.deviation,
            summary.total.plan - summary.total.actual
        );
        assert_eq!(summary.total.plan, 1100.0);
        assert_eq!(summary.total.actual, 1100.0);
        assert_eq!(summary.total.deviation, 0.0);
        for row in &summary.rows {
            assert_eq!(row.deviation, row.plan - row.actual);
        }
    }

    #[test]
    fn test_period_summary_ignores_other_periods_plans() {
        let mut snapshot = scenario();
        snapshot.plans.push(plan_model(2, 3, 900.0, 2, 2024));

        let summary = period_summary(&snapshot, Period::new(3, 2024).unwrap());
        let rent = summary.rows.iter().find(|r| r.category == "Rent").unwrap();
        assert_eq!(rent.plan, 0.0);
    }

    #[test]
    fn test_rows_with_total_appends_total_last() {
        let summary = period_summary(&scenario(), Period::new(3, 2024).unwrap());
        let rows = summary.rows_with_total();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.last().unwrap().category, TOTAL_LABEL);

        let (plan, actual) = summary.plan_actual_series();
        assert_eq!(plan, [("Food".to_string(), 200.0), ("Rent".to_string(), 0.0)]);
        assert_eq!(actual, [("Food".to_string(), 150.0), ("Rent".to_string(), 0.0)]);
    }

    #[test]
    fn test_category_distribution_omits_empty_categories() {
        let distribution = category_distribution(&scenario(), Period::new(3, 2024).unwrap());
        assert_eq!(
            distribution,
            vec![CategoryTotal {
                category: "Food".to_string(),
                total: 150.0,
            }]
        );
    }

    #[test]
    fn test_category_distribution_keeps_categories_netting_to_zero() {
        let mut snapshot = scenario();
        snapshot.transactions.push(tx(5, date(2024, 3, 3), 3, 40.0));
        snapshot.transactions.push(tx(6, date(2024, 3, 4), 3, -40.0));

        let distribution = category_distribution(&snapshot, Period::new(3, 2024).unwrap());
        let names: Vec<_> = distribution.iter().map(|d| d.category.as_str()).collect();
        assert_eq!(names, ["Food", "Rent"]);
        assert_eq!(distribution[1].total, 0.0);
    }

    #[test]
    fn test_annual_distribution_with_filters() {
        let mut snapshot = scenario();
        snapshot
            .transactions
            .push(transaction_model(5, date(2024, 3, 5), 1, 2, 30.0));

        let everything = annual_distribution(&snapshot, &TransactionFilter::all());
        assert_eq!(
            everything,
            vec![
                CategoryTotal {
                    category: "Food".to_string(),
                    total: 180.0,
                },
                CategoryTotal {
                    category: "Rent".to_string(),
                    total: 700.0,
                },
            ]
        );

        let card = TransactionFilter::for_wallet_and_range(Some("Card"), None, None);
        assert_eq!(
            annual_distribution(&snapshot, &card),
            vec![CategoryTotal {
                category: "Food".to_string(),
                total: 30.0,
            }]
        );

        let march_onwards =
            TransactionFilter::for_wallet_and_range(None, Some(date(2024, 3, 1)), None);
        let names: Vec<_> = annual_distribution(&snapshot, &march_onwards)
            .into_iter()
            .map(|d| d.category)
            .collect();
        assert_eq!(names, ["Food"]);

        let until_feb =
            TransactionFilter::for_wallet_and_range(None, None, Some(date(2024, 2, 10)));
        let names: Vec<_> = annual_distribution(&snapshot, &until_feb)
            .into_iter()
            .map(|d| d.category)
            .collect();
        assert_eq!(names, ["Rent"]);

        let unknown = TransactionFilter::for_wallet_and_range(Some("Vault"), None, None);
        assert!(annual_distribution(&snapshot, &unknown).is_empty());
    }

    #[test]
    fn test_monthly_dynamics_single_bucket() {
        let snapshot = LedgerSnapshot {
            directory: scenario().directory,
            transactions: vec![
                tx(1, date(2024, 1, 3), 1, 50.0),
                tx(2, date(2024, 1, 28), 2, 500.0),
            ],
            plans: vec![],
        };

        let dynamics = monthly_dynamics(&snapshot, &TransactionFilter::all());
        assert_eq!(
            dynamics.points,
            vec![MonthlyPoint {
                label: "2024-01".to_string(),
                expense: 50.0,
                income: 500.0,
            }]
        );
    }

    #[test]
    fn test_monthly_dynamics_orders_buckets_and_skips_gaps() {
        let snapshot = LedgerSnapshot {
            directory: scenario().directory,
            transactions: vec![
                tx(1, date(2024, 3, 1), 1, 10.0),
                tx(2, date(2023, 12, 31), 1, 20.0),
                tx(3, date(2024, 1, 15), 2, 1000.0),
            ],
            plans: vec![],
        };

        let dynamics = monthly_dynamics(&snapshot, &TransactionFilter::all());
        let labels: Vec<_> = dynamics.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["2023-12", "2024-01", "2024-03"]);

        assert_eq!(
            dynamics.expense_series(),
            [
                ("2023-12".to_string(), 20.0),
                ("2024-01".to_string(), 0.0),
                ("2024-03".to_string(), 10.0),
            ]
        );
        assert_eq!(dynamics.income_series()[1], ("2024-01".to_string(), 1000.0));
    }

    #[tokio::test]
    async fn test_compute_period_summary_from_store() -> Result<()> {
        let fixture = setup_directory().await?;
        let db = &fixture.db;
        create_test_category(db, "Rent", CategoryType::Expense).await?;

        record(db, date(2024, 3, 2), "Food", "100").await?;
        record(db, date(2024, 3, 20), "Food", "50").await?;
        record(db, date(2024, 3, 25), "Salary", "2000").await?;
        record(db, date(2024, 4, 1), "Food", "999").await?;
        upsert_plan(db, "Food", 3, 2024, "200").await?;

        let summary = compute_period_summary(db, 3, 2024).await?;
        let rows: Vec<_> = summary
            .rows
            .iter()
            .map(|r| (r.category.as_str(), r.plan, r.actual, r.deviation))
            .collect();
        assert_eq!(rows, [("Food", 200.0, 150.0, 50.0), ("Rent", 0.0, 0.0, 0.0)]);
        assert_eq!(summary.total.plan, 200.0);
        assert_eq!(summary.total.actual, 150.0);
        assert_eq!(summary.total.deviation, 50.0);

        // Same store, same answer
        assert_eq!(compute_period_summary(db, 3, 2024).await?, summary);

        let distribution = compute_category_distribution(db, 3, 2024).await?;
        assert_eq!(
            distribution,
            vec![CategoryTotal {
                category: "Food".to_string(),
                total: 150.0,
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_compute_summary_rejects_invalid_month() -> Result<()> {
        let db = setup_test_db().await?;
        let result = compute_period_summary(&db, 0, 2024).await;
        assert!(matches!(
            result,
            Err(crate::errors::Error::InvalidInput { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_plan_edit_is_visible_on_refresh() -> Result<()> {
        let fixture = setup_directory().await?;
        let db = &fixture.db;
        record(db, date(2024, 3, 2), "Food", "100").await?;

        let before = compute_period_summary(db, 3, 2024).await?;
        assert_eq!(before.total.plan, 0.0);
        assert_eq!(before.total.deviation, -100.0);

        upsert_plan(db, "Food", 3, 2024, "120").await?;
        upsert_plan(db, "Food", 3, 2024, "80").await?;

        let after = compute_period_summary(db, 3, 2024).await?;
        assert_eq!(after.total.plan, 80.0);
        assert_eq!(after.total.deviation, -20.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_compute_dashboard_reports_from_store() -> Result<()> {
        let fixture = setup_directory().await?;
        let db = &fixture.db;
        create_wallet_named(db, "Card").await?;

        record(db, date(2024, 1, 5), "Food", "50").await?;
        record(db, date(2024, 1, 25), "Salary", "500").await?;
        record_in_wallet(db, date(2024, 2, 5), "Food", "30", "Card").await?;

        let dynamics = compute_monthly_dynamics(db, None, None, Some(date(2024, 1, 31))).await?;
        assert_eq!(
            dynamics.points,
            vec![MonthlyPoint {
                label: "2024-01".to_string(),
                expense: 50.0,
                income: 500.0,
            }]
        );

        let card = compute_monthly_dynamics(db, Some("Card"), None, None).await?;
        assert_eq!(card.points.len(), 1);
        assert_eq!(card.points[0].label, "2024-02");

        let annual = compute_annual_distribution(db, Some(""), None, None).await?;
        assert_eq!(
            annual,
            vec![CategoryTotal {
                category: "Food".to_string(),
                total: 80.0,
            }]
        );

        let none = compute_annual_distribution(db, Some("Vault"), None, None).await?;
        assert!(none.is_empty());
        Ok(())
    }
}
