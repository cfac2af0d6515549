//! Aggregate (summary) store contract.

use async_trait::async_trait;
use chrono::NaiveDate;
use common::DailySummary;

use crate::Result;

/// Outcome of an idempotent summary insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written for the date.
    Inserted,
    /// A row for the date already existed; nothing was written.
    AlreadyExists,
}

/// Relational store holding at most one durable row per summary date.
///
/// This is the non-critical secondary store: callers treat a fault here as
/// a degradation, not a failure of the summary operation itself.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Inserts the summary only if no row exists for its date.
    ///
    /// Existing rows are never updated; a summary is captured once.
    async fn insert_if_absent(&self, summary: &DailySummary) -> Result<InsertOutcome>;

    /// Fetches the stored summary for a date, if any.
    async fn get(&self, date: NaiveDate) -> Result<Option<DailySummary>>;
}
