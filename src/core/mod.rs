//! Core business logic - framework-agnostic directory, ledger, plan and report
//! operations.

/// Plan vs. actual summaries, distributions and monthly dynamics
pub mod aggregation;
/// Name↔id resolution and directory management
pub mod directory;
/// CSV export of transactions
pub mod export;
/// Transaction entry, deletion and filtered retrieval
pub mod ledger;
/// Reporting periods, filters and amount parsing
pub mod period;
/// Sparse monthly budget table and the plan upsert
pub mod plan;
/// Background report execution with superseding requests
pub mod worker;
