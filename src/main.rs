use budget_ledger::{
    config::{database, directory},
    core::{
        period::{Period, TransactionFilter},
        worker::{Report, ReportRequest, ReportWorker},
    },
    errors::Result,
};
use chrono::Local;
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load the directory seed configuration
    let config = directory::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Seed directory entries that are not stored yet
    let seeded = directory::seed_directory(&db, &config).await?;
    info!("Seeded {} directory entries", seeded);

    // 6. Report on the current month and the whole ledger
    let period = Period::containing(Local::now().date_naive());
    let worker = ReportWorker::new(db);
    let summary = worker.submit(ReportRequest::PeriodSummary(period));
    let dynamics = worker.submit(ReportRequest::MonthlyDynamics(TransactionFilter::all()));

    if let Report::PeriodSummary(summary) = summary.wait().await? {
        info!("Plan vs. actual for {}", summary.period);
        for row in summary.rows_with_total() {
            info!(
                "{:<20} plan {:>10.2} actual {:>10.2} deviation {:>10.2}",
                row.category, row.plan, row.actual, row.deviation
            );
        }
    }

    if let Report::MonthlyDynamics(dynamics) = dynamics.wait().await? {
        for point in &dynamics.points {
            info!(
                "{} expense {:.2} income {:.2}",
                point.label, point.expense, point.income
            );
        }
    }

    Ok(())
}
