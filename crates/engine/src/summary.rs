//! Daily sales summarization.

use std::collections::HashMap;

use chrono::NaiveDate;
use common::{DailySummary, Money, Order, StoreScope};
use serde::Serialize;
use store::{InsertOutcome, OrderStore, StoreError, SummaryStore};

use crate::artifact::{ArtifactGenerator, ArtifactRef};
use crate::error::Result;

/// What happened to the summary row in the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryOutcome {
    /// A new row was written for this date.
    Stored,
    /// A row for this date already existed and was left untouched.
    AlreadyStored,
    /// The store was unreachable. The summary and its artifact still
    /// exist; only the persisted row is missing.
    Degraded,
}

/// Result of a summary run: the computed figures, what the store did
/// with them, and the rendered report if rendering succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReceipt {
    pub summary: DailySummary,
    pub outcome: SummaryOutcome,
    pub artifact: Option<ArtifactRef>,
}

/// Computes daily sales summaries and persists them idempotently.
///
/// Storage is strictly insert-if-absent: re-running a day never
/// overwrites the first recorded figures. A store outage degrades the
/// run instead of failing it, since the report itself is still useful.
pub struct SummaryEngine<O, S, A> {
    orders: O,
    summaries: S,
    artifacts: A,
}

impl<O, S, A> SummaryEngine<O, S, A>
where
    O: OrderStore,
    S: SummaryStore,
    A: ArtifactGenerator,
{
    /// Creates a summary engine over the given collaborators.
    pub fn new(orders: O, summaries: S, artifacts: A) -> Self {
        Self {
            orders,
            summaries,
            artifacts,
        }
    }

    /// Computes the summary for one day from its orders.
    ///
    /// The most popular product is the one with the highest unit tally;
    /// ties resolve to the lexicographically smallest name so repeated
    /// runs over the same orders always agree.
    #[tracing::instrument(skip(self))]
    pub async fn generate(&self, date: NaiveDate, scope: &StoreScope) -> Result<DailySummary> {
        let orders = self.orders.orders_for_date(date).await?;
        let orders: Vec<&Order> = orders.iter().filter(|o| &o.scope == scope).collect();

        let total_orders = orders.len() as u64;
        let total_revenue: Money = orders.iter().map(|o| o.order_total).sum();

        let mut tally: HashMap<&str, u64> = HashMap::new();
        for order in &orders {
            for item in &order.items {
                *tally.entry(item.product_name.as_str()).or_default() += item.quantity as u64;
            }
        }
        let most_popular_product = tally
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
            .map(|(name, _)| name.to_string());

        tracing::debug!(%date, total_orders, "summary computed");
        Ok(DailySummary {
            date,
            total_orders,
            total_revenue,
            most_popular_product,
        })
    }

    /// Persists a summary and renders its report.
    ///
    /// The artifact is rendered on every call, including reruns over an
    /// already-stored date. Store unavailability is absorbed into a
    /// `Degraded` outcome rather than returned as an error.
    #[tracing::instrument(skip(self, summary), fields(date = %summary.date))]
    pub async fn store(&self, summary: &DailySummary) -> SummaryReceipt {
        let outcome = match self.summaries.insert_if_absent(summary).await {
            Ok(InsertOutcome::Inserted) => SummaryOutcome::Stored,
            Ok(InsertOutcome::AlreadyExists) => {
                tracing::info!(date = %summary.date, "summary already stored, leaving row untouched");
                SummaryOutcome::AlreadyStored
            }
            Err(StoreError::Unavailable(reason)) => {
                metrics::counter!("summaries_degraded_total").increment(1);
                tracing::warn!(date = %summary.date, %reason, "summary store unreachable, continuing degraded");
                SummaryOutcome::Degraded
            }
            Err(e) => {
                metrics::counter!("summaries_degraded_total").increment(1);
                tracing::warn!(date = %summary.date, error = %e, "summary store failed, continuing degraded");
                SummaryOutcome::Degraded
            }
        };

        let artifact = match self.artifacts.render_summary(summary).await {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                tracing::warn!(date = %summary.date, error = %e, "summary rendering failed");
                None
            }
        };

        SummaryReceipt {
            summary: summary.clone(),
            outcome,
            artifact,
        }
    }

    /// Computes and persists the summary for one day.
    pub async fn generate_and_store(
        &self,
        date: NaiveDate,
        scope: &StoreScope,
    ) -> Result<SummaryReceipt> {
        let summary = self.generate(date, scope).await?;
        Ok(self.store(&summary).await)
    }
}
