//! Order store contract.

use async_trait::async_trait;
use chrono::NaiveDate;
use common::Order;

use crate::Result;

/// Append/upsert store for placed orders.
///
/// Orders are written once by the order engine and never mutated; a
/// re-submission of the same derived order ID replaces the record.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order record (insert or replace by ID).
    async fn put_order(&self, order: &Order) -> Result<()>;

    /// Returns all orders placed on the given date, in no particular order.
    async fn orders_for_date(&self, date: NaiveDate) -> Result<Vec<Order>>;
}
