//! In-memory store implementations for testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{DailySummary, Order, Product, ProductId, StoreScope, Supplier, Version};
use tokio::sync::RwLock;

use crate::{CatalogStore, InsertOutcome, OrderStore, Result, StoreError, SummaryStore};

/// In-memory catalog store.
///
/// Provides the same conditional-update semantics as the PostgreSQL
/// implementation: a rewrite with a stale version is rejected with
/// `VersionConflict`.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    products: Arc<RwLock<HashMap<(StoreScope, ProductId), Product>>>,
    suppliers: Arc<RwLock<HashMap<(StoreScope, String), Supplier>>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty catalog store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of product records.
    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get_product(&self, id: &ProductId, scope: &StoreScope) -> Result<Product> {
        let products = self.products.read().await;
        products
            .get(&(scope.clone(), id.clone()))
            .cloned()
            .ok_or_else(|| StoreError::ProductNotFound {
                product_id: id.clone(),
                scope: scope.clone(),
            })
    }

    async fn update_product(
        &self,
        product: &Product,
        expected_version: Version,
    ) -> Result<Version> {
        let mut products = self.products.write().await;
        let key = (product.scope.clone(), product.id.clone());

        let current = products
            .get(&key)
            .ok_or_else(|| StoreError::ProductNotFound {
                product_id: product.id.clone(),
                scope: product.scope.clone(),
            })?;

        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                product_id: product.id.clone(),
                expected: expected_version,
                actual: current.version,
            });
        }

        let mut updated = product.clone();
        updated.version = expected_version.next();
        let new_version = updated.version;
        products.insert(key, updated);
        Ok(new_version)
    }

    async fn upsert_product(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().await;
        products.insert((product.scope.clone(), product.id.clone()), product.clone());
        Ok(())
    }

    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<()> {
        let mut suppliers = self.suppliers.write().await;
        suppliers.insert(
            (supplier.scope.clone(), supplier.id.as_str().to_string()),
            supplier.clone(),
        );
        Ok(())
    }

    async fn list_products(&self, scope: &StoreScope) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut listed: Vec<_> = products
            .values()
            .filter(|p| &p.scope == scope)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(listed)
    }
}

/// In-memory order store.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn put_order(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.as_str().to_string(), order.clone());
        Ok(())
    }

    async fn orders_for_date(&self, date: NaiveDate) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .filter(|o| o.order_date == date)
            .cloned()
            .collect())
    }
}

/// In-memory summary store with fault injection.
///
/// `set_fail(true)` makes every call fail with `Unavailable`, for
/// exercising the summary engine's degraded path.
#[derive(Clone, Default)]
pub struct InMemorySummaryStore {
    summaries: Arc<RwLock<HashMap<NaiveDate, DailySummary>>>,
    fail: Arc<AtomicBool>,
}

impl InMemorySummaryStore {
    /// Creates a new empty summary store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail all calls, simulating an unreachable
    /// backing database.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored summary rows.
    pub async fn row_count(&self) -> usize {
        self.summaries.read().await.len()
    }

    fn check_available(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "summary store unreachable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SummaryStore for InMemorySummaryStore {
    async fn insert_if_absent(&self, summary: &DailySummary) -> Result<InsertOutcome> {
        self.check_available()?;
        let mut summaries = self.summaries.write().await;
        if summaries.contains_key(&summary.date) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        summaries.insert(summary.date, summary.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn get(&self, date: NaiveDate) -> Result<Option<DailySummary>> {
        self.check_available()?;
        let summaries = self.summaries.read().await;
        Ok(summaries.get(&date).cloned())
    }
}
