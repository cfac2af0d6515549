//! Daily summary record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Money;

/// Aggregate of all orders placed on one date.
///
/// Derived data: recomputable at any time from the orders with a matching
/// `order_date`, and not itself a source of truth. Persisted to the
/// aggregate store at most once per date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// The date the summary covers.
    pub date: NaiveDate,

    /// Number of orders placed on that date.
    pub total_orders: u64,

    /// Sum of all order totals.
    pub total_revenue: Money,

    /// Product name with the highest unit tally across all line items,
    /// or `None` when the date has no orders.
    pub most_popular_product: Option<String>,
}

impl DailySummary {
    /// Returns an empty summary for a date with no orders.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_orders: 0,
            total_revenue: Money::zero(),
            most_popular_product: None,
        }
    }
}
