//! Background report execution.
//!
//! [`ReportWorker`] runs aggregation requests as spawned tasks so callers are not
//! blocked while a report is loaded. At most one task per request key is in
//! flight: submitting a request equal to one still running aborts the older task,
//! and the older [`ReportHandle`] resolves to [`Error::Superseded`]. Writes never
//! go through the worker and are never cancelled.

use crate::{
    core::{
        aggregation::{
            self, CategoryTotal, MonthlyDynamics, PeriodSummary, annual_distribution,
            monthly_dynamics,
        },
        period::{Period, TransactionFilter},
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};

/// A report the worker can compute. Equal requests share one in-flight slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportRequest {
    /// Plan vs. actual for one period
    PeriodSummary(Period),
    /// Expense distribution for one period
    CategoryDistribution(Period),
    /// Expense distribution over a wallet/date filter
    AnnualDistribution(TransactionFilter),
    /// Monthly income/expense series over a wallet/date filter
    MonthlyDynamics(TransactionFilter),
}

/// Result of a [`ReportRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Answer to [`ReportRequest::PeriodSummary`]
    PeriodSummary(PeriodSummary),
    /// Answer to either distribution request
    Distribution(Vec<CategoryTotal>),
    /// Answer to [`ReportRequest::MonthlyDynamics`]
    MonthlyDynamics(MonthlyDynamics),
}

/// Computes `request` against the current store.
pub async fn run_report(db: &DatabaseConnection, request: &ReportRequest) -> Result<Report> {
    match request {
        ReportRequest::PeriodSummary(period) => {
            let snapshot = aggregation::load_period_snapshot(db, *period).await?;
            Ok(Report::PeriodSummary(aggregation::period_summary(
                &snapshot, *period,
            )))
        }
        ReportRequest::CategoryDistribution(period) => {
            let snapshot = aggregation::load_period_snapshot(db, *period).await?;
            Ok(Report::Distribution(aggregation::category_distribution(
                &snapshot, *period,
            )))
        }
        ReportRequest::AnnualDistribution(filter) => {
            let snapshot = aggregation::load_filtered_snapshot(db, filter).await?;
            Ok(Report::Distribution(annual_distribution(&snapshot, filter)))
        }
        ReportRequest::MonthlyDynamics(filter) => {
            let snapshot = aggregation::load_filtered_snapshot(db, filter).await?;
            Ok(Report::MonthlyDynamics(monthly_dynamics(&snapshot, filter)))
        }
    }
}

type InFlight = HashMap<ReportRequest, (u64, AbortHandle)>;

/// Runs reports off the caller's path, superseding older equal requests.
#[derive(Debug, Clone)]
pub struct ReportWorker {
    db: DatabaseConnection,
    in_flight: Arc<Mutex<InFlight>>,
    next_ticket: Arc<AtomicU64>,
}

/// Pending result of a submitted report.
#[derive(Debug)]
pub struct ReportHandle {
    handle: JoinHandle<Result<Report>>,
}

impl ReportHandle {
    /// Waits for the report.
    ///
    /// # Errors
    /// [`Error::Superseded`] when a newer equal request replaced this one, or the
    /// error the report itself failed with.
    pub async fn wait(self) -> Result<Report> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Error::Superseded),
            Err(e) => Err(Error::Worker {
                message: e.to_string(),
            }),
        }
    }
}

fn lock(in_flight: &Mutex<InFlight>) -> MutexGuard<'_, InFlight> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ReportWorker {
    /// Creates a worker over a shared connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_ticket: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts computing `request`, aborting any in-flight task for an equal request.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: ReportRequest) -> ReportHandle {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let db = self.db.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let key = request.clone();

        // Held across spawn so the task cannot deregister before it is registered.
        let mut guard = lock(&self.in_flight);

        let handle = tokio::spawn(async move {
            let result = run_report(&db, &request).await;
            if let Err(e) = &result {
                warn!("Report {request:?} failed: {e}");
            }

            let mut map = lock(&in_flight);
            if map.get(&request).is_some_and(|(owner, _)| *owner == ticket) {
                map.remove(&request);
            }
            result
        });

        if let Some((previous, abort)) = guard.insert(key, (ticket, handle.abort_handle())) {
            debug!(previous, ticket, "Superseding in-flight report");
            abort.abort();
        }
        drop(guard);

        ReportHandle { handle }
    }

    /// Number of reports currently registered as in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }
}
