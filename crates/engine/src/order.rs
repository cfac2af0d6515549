//! Order validation and placement.

use std::collections::HashMap;

use common::{Order, OrderId, Product, ProductId};
use serde::Serialize;
use store::{CatalogStore, OrderStore, StoreError};

use crate::artifact::{ArtifactGenerator, ArtifactRef};
use crate::error::{EngineError, Result};

/// Attempts per product before a conditional stock commit is given up as
/// a transient fault.
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Stock level below which a low-stock warning is emitted.
const LOW_STOCK_THRESHOLD: u32 = 10;

/// Outcome of an order placement attempt.
///
/// A rejection is a policy result, not a fault: the caller decides how to
/// present it (the storefront offers the preorder option).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Placement {
    /// The order was committed: stock decremented, order record written.
    Placed {
        order_id: OrderId,
        /// Preorder and low-stock notices, grouped by product in first
        /// line-item order.
        warnings: Vec<String>,
        /// Invoice reference, `None` if rendering failed (non-fatal).
        invoice: Option<ArtifactRef>,
    },
    /// An item requested more units than available and preorder was not
    /// allowed. No order record is written.
    Rejected {
        product_id: ProductId,
        message: String,
        available: u32,
        /// The same order would be accepted with preorder enabled.
        preorder_eligible: bool,
    },
}

/// One product's pending stock effect, accumulated across the order's
/// line items before anything is written.
struct StagedDecrement {
    product: Product,
    /// Units requested across all of this product's line items.
    requested: u32,
    /// Units to commit after any preorder clamp.
    units: u32,
    /// Preorder and low-stock notices for this product.
    warnings: Vec<String>,
}

impl StagedDecrement {
    /// Replaces staging-time warnings with ones computed from the record
    /// actually committed against. Staged counts go stale when a lost
    /// version race forces a re-read.
    fn rebuild_warnings(&mut self) {
        self.warnings.clear();
        let shortfall = self.requested - self.units;
        if shortfall > 0 {
            self.warnings
                .push(format!("Pre-order placed for {shortfall} unit(s)"));
        }
        let remaining = self.product.stock_quantity - self.units;
        if remaining < LOW_STOCK_THRESHOLD {
            self.warnings.push(format!(
                "Low stock alert: {} ({} left)",
                self.product.name, remaining
            ));
        }
    }
}

enum CommitOutcome {
    Committed,
    Rejected { available: u32 },
}

/// Validates orders against current stock and commits them.
///
/// Placement is two-phase: every line item is staged and validated against
/// a fresh read of the catalog first, and only a fully valid order starts
/// writing. Each product's decrement is a conditional update on the record
/// version, retried against a re-read record when a concurrent order wins
/// the race.
pub struct OrderEngine<C, O, A> {
    catalog: C,
    orders: O,
    artifacts: A,
}

impl<C, O, A> OrderEngine<C, O, A>
where
    C: CatalogStore,
    O: OrderStore,
    A: ArtifactGenerator,
{
    /// Creates an order engine over the given collaborators.
    pub fn new(catalog: C, orders: O, artifacts: A) -> Self {
        Self {
            catalog,
            orders,
            artifacts,
        }
    }

    /// Validates and places an order.
    ///
    /// With `allow_preorder`, a request exceeding available stock is
    /// clamped to what is on hand and the shortfall recorded as a
    /// `"Pre-order placed for N unit(s)"` warning; otherwise the whole
    /// order is rejected before any write. Same-product repeats within
    /// one order accumulate against the same stock.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn place_order(&self, order: &Order, allow_preorder: bool) -> Result<Placement> {
        if order.items.is_empty() {
            return Err(EngineError::InvalidOrder {
                reason: "order has no items".to_string(),
            });
        }
        if let Some(item) = order.items.iter().find(|i| i.quantity == 0) {
            return Err(EngineError::InvalidOrder {
                reason: format!("zero quantity for {}", item.product_id),
            });
        }

        // Stage: validate every item against a fresh read before any write.
        let mut staged: Vec<StagedDecrement> = Vec::new();
        let mut staged_index: HashMap<ProductId, usize> = HashMap::new();

        for item in &order.items {
            let idx = match staged_index.get(&item.product_id) {
                Some(&idx) => idx,
                None => {
                    let product = self.catalog.get_product(&item.product_id, &order.scope).await?;
                    staged.push(StagedDecrement {
                        product,
                        requested: 0,
                        units: 0,
                        warnings: Vec::new(),
                    });
                    staged_index.insert(item.product_id.clone(), staged.len() - 1);
                    staged.len() - 1
                }
            };
            let entry = &mut staged[idx];

            let available = entry.product.stock_quantity - entry.units;
            let requested = item.quantity;
            entry.requested += requested;

            let commit_units = if requested > available {
                if !allow_preorder {
                    metrics::counter!("orders_rejected_total").increment(1);
                    tracing::info!(
                        product_id = %item.product_id,
                        requested,
                        available,
                        "order rejected, insufficient stock without preorder"
                    );
                    return Ok(Placement::Rejected {
                        product_id: item.product_id.clone(),
                        message: format!("Only {available} unit(s) available."),
                        available,
                        preorder_eligible: true,
                    });
                }
                entry.warnings.push(format!(
                    "Pre-order placed for {} unit(s)",
                    requested - available
                ));
                available
            } else {
                requested
            };

            entry.units += commit_units;

            let remaining = entry.product.stock_quantity - entry.units;
            if remaining < LOW_STOCK_THRESHOLD {
                entry.warnings.push(format!(
                    "Low stock alert: {} ({} left)",
                    entry.product.name, remaining
                ));
            }
        }

        // Commit: conditional decrement per product, bounded retry on a
        // lost version race.
        for entry in &mut staged {
            match self.commit_decrement(entry, allow_preorder).await? {
                CommitOutcome::Committed => {}
                CommitOutcome::Rejected { available } => {
                    metrics::counter!("orders_rejected_total").increment(1);
                    return Ok(Placement::Rejected {
                        product_id: entry.product.id.clone(),
                        message: format!("Only {available} unit(s) available."),
                        available,
                        preorder_eligible: true,
                    });
                }
            }
        }

        let warnings: Vec<String> = staged
            .iter()
            .flat_map(|entry| entry.warnings.iter().cloned())
            .collect();

        self.orders.put_order(order).await?;

        let invoice = match self.artifacts.render_invoice(order).await {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                tracing::warn!(error = %e, order_id = %order.id, "invoice rendering failed");
                None
            }
        };

        metrics::counter!("orders_placed_total").increment(1);
        Ok(Placement::Placed {
            order_id: order.id.clone(),
            warnings,
            invoice,
        })
    }

    /// Commits one product's staged decrement.
    ///
    /// On a version conflict the product is re-read and the preorder
    /// policy re-applied to the fresh stock, since the stock seen at
    /// staging time may be gone. A retried commit rebuilds the product's
    /// warnings from the record it actually landed on, so preorder
    /// shortfalls and low-stock counts reflect the committed stock.
    async fn commit_decrement(
        &self,
        entry: &mut StagedDecrement,
        allow_preorder: bool,
    ) -> Result<CommitOutcome> {
        let mut conflicted = false;

        for _attempt in 0..MAX_COMMIT_ATTEMPTS {
            let mut updated = entry.product.clone();
            updated.stock_quantity = entry.product.stock_quantity - entry.units;

            match self
                .catalog
                .update_product(&updated, entry.product.version)
                .await
            {
                Ok(_) => {
                    if conflicted {
                        entry.rebuild_warnings();
                    }
                    return Ok(CommitOutcome::Committed);
                }
                Err(StoreError::VersionConflict { .. }) => {
                    conflicted = true;
                    metrics::counter!("stock_version_conflicts_total").increment(1);
                    tracing::debug!(product_id = %entry.product.id, "stock commit lost version race, re-reading");

                    entry.product = self
                        .catalog
                        .get_product(&entry.product.id, &entry.product.scope)
                        .await?;
                    if entry.units > entry.product.stock_quantity {
                        if !allow_preorder {
                            return Ok(CommitOutcome::Rejected {
                                available: entry.product.stock_quantity,
                            });
                        }
                        entry.units = entry.product.stock_quantity;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::Conflict {
            product_id: entry.product.id.clone(),
            attempts: MAX_COMMIT_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use common::{Customer, Money, OrderLineItem, StoreScope, Version};
    use store::{InMemoryCatalogStore, InMemoryOrderStore};

    use crate::artifact::InMemoryArtifactGenerator;

    async fn engine_with_stock(
        stock: u32,
    ) -> (
        OrderEngine<InMemoryCatalogStore, InMemoryOrderStore, InMemoryArtifactGenerator>,
        InMemoryCatalogStore,
        InMemoryOrderStore,
    ) {
        let catalog = InMemoryCatalogStore::new();
        let orders = InMemoryOrderStore::new();
        let artifacts = InMemoryArtifactGenerator::new();

        let apple = Product::new(
            "prod_001",
            "Apple",
            "Fruit",
            Money::from_cents(350),
            stock,
            "sup_1",
            "norwood",
        );
        catalog.upsert_product(&apple).await.unwrap();

        let engine = OrderEngine::new(catalog.clone(), orders.clone(), artifacts);
        (engine, catalog, orders)
    }

    fn apple_order(quantity: u32) -> Order {
        Order::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            Customer::new("Jane", "jane@example.com"),
            vec![OrderLineItem::new(
                "prod_001",
                "Apple",
                quantity,
                Money::from_cents(350),
            )],
            "norwood",
        )
    }

    async fn stock_of(catalog: &InMemoryCatalogStore) -> u32 {
        catalog
            .get_product(&ProductId::new("prod_001"), &StoreScope::new("norwood"))
            .await
            .unwrap()
            .stock_quantity
    }

    #[tokio::test]
    async fn placing_within_stock_decrements_exactly() {
        let (engine, catalog, orders) = engine_with_stock(20).await;

        let placement = engine.place_order(&apple_order(5), false).await.unwrap();
        assert!(matches!(placement, Placement::Placed { .. }));
        assert_eq!(stock_of(&catalog).await, 15);
        assert_eq!(orders.order_count().await, 1);
    }

    #[tokio::test]
    async fn oversell_without_preorder_is_rejected_and_stock_unchanged() {
        let (engine, catalog, orders) = engine_with_stock(20).await;

        let placement = engine.place_order(&apple_order(25), false).await.unwrap();
        match placement {
            Placement::Rejected {
                available,
                preorder_eligible,
                message,
                ..
            } => {
                assert_eq!(available, 20);
                assert!(preorder_eligible);
                assert_eq!(message, "Only 20 unit(s) available.");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(stock_of(&catalog).await, 20);
        assert_eq!(orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn oversell_with_preorder_clamps_to_zero_and_warns() {
        let (engine, catalog, _orders) = engine_with_stock(20).await;

        let placement = engine.place_order(&apple_order(25), true).await.unwrap();
        match placement {
            Placement::Placed { warnings, .. } => {
                assert!(
                    warnings.contains(&"Pre-order placed for 5 unit(s)".to_string()),
                    "warnings: {warnings:?}"
                );
                assert!(
                    warnings.contains(&"Low stock alert: Apple (0 left)".to_string()),
                    "warnings: {warnings:?}"
                );
            }
            other => panic!("expected placement, got {other:?}"),
        }
        assert_eq!(stock_of(&catalog).await, 0);
    }

    #[tokio::test]
    async fn low_stock_warning_below_threshold() {
        let (engine, catalog, _orders) = engine_with_stock(12).await;

        let placement = engine.place_order(&apple_order(4), false).await.unwrap();
        match placement {
            Placement::Placed { warnings, .. } => {
                assert_eq!(warnings, vec!["Low stock alert: Apple (8 left)".to_string()]);
            }
            other => panic!("expected placement, got {other:?}"),
        }
        assert_eq!(stock_of(&catalog).await, 8);
    }

    #[tokio::test]
    async fn same_product_repeats_accumulate() {
        let (engine, catalog, _orders) = engine_with_stock(20).await;

        let order = Order::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            Customer::new("Jane", "jane@example.com"),
            vec![
                OrderLineItem::new("prod_001", "Apple", 12, Money::from_cents(350)),
                OrderLineItem::new("prod_001", "Apple", 12, Money::from_cents(350)),
            ],
            "norwood",
        );

        // Second line sees only the 8 units the first line left.
        let placement = engine.place_order(&order, false).await.unwrap();
        match placement {
            Placement::Rejected { available, .. } => assert_eq!(available, 8),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(stock_of(&catalog).await, 20);
    }

    #[tokio::test]
    async fn unknown_product_is_a_fault() {
        let (engine, _catalog, orders) = engine_with_stock(20).await;

        let order = Order::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            Customer::new("Jane", "jane@example.com"),
            vec![OrderLineItem::new(
                "prod_999",
                "Ghost",
                1,
                Money::from_cents(100),
            )],
            "norwood",
        );

        let result = engine.place_order(&order, false).await;
        assert!(matches!(
            result,
            Err(EngineError::ProductNotFound { .. })
        ));
        assert_eq!(orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn empty_order_is_invalid() {
        let (engine, _catalog, _orders) = engine_with_stock(20).await;

        let order = Order::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            Customer::new("Jane", "jane@example.com"),
            vec![],
            "norwood",
        );

        let result = engine.place_order(&order, false).await;
        assert!(matches!(result, Err(EngineError::InvalidOrder { .. })));
    }

    #[tokio::test]
    async fn rejected_multi_item_order_commits_nothing() {
        let (engine, catalog, orders) = engine_with_stock(20).await;

        let banana = Product::new(
            "prod_002",
            "Banana",
            "Fruit",
            Money::from_cents(280),
            3,
            "sup_1",
            "norwood",
        );
        catalog.upsert_product(&banana).await.unwrap();

        // First item is satisfiable, second is not: staging rejects the
        // whole order before any stock is touched.
        let order = Order::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            Customer::new("Jane", "jane@example.com"),
            vec![
                OrderLineItem::new("prod_001", "Apple", 5, Money::from_cents(350)),
                OrderLineItem::new("prod_002", "Banana", 10, Money::from_cents(280)),
            ],
            "norwood",
        );

        let placement = engine.place_order(&order, false).await.unwrap();
        assert!(matches!(placement, Placement::Rejected { .. }));
        assert_eq!(stock_of(&catalog).await, 20);
        let banana_stock = catalog
            .get_product(&ProductId::new("prod_002"), &StoreScope::new("norwood"))
            .await
            .unwrap()
            .stock_quantity;
        assert_eq!(banana_stock, 3);
        assert_eq!(orders.order_count().await, 0);
    }

    /// Catalog wrapper that loses the version race a fixed number of
    /// times: each doomed `update_product` is preempted by a concurrent
    /// two-unit decrement before being forwarded.
    #[derive(Clone)]
    struct RacingCatalog {
        inner: InMemoryCatalogStore,
        races_left: Arc<AtomicU32>,
    }

    #[async_trait]
    impl CatalogStore for RacingCatalog {
        async fn get_product(
            &self,
            id: &ProductId,
            scope: &StoreScope,
        ) -> store::Result<Product> {
            self.inner.get_product(id, scope).await
        }

        async fn update_product(
            &self,
            product: &Product,
            expected_version: Version,
        ) -> store::Result<Version> {
            if self.races_left.load(Ordering::SeqCst) > 0 {
                self.races_left.fetch_sub(1, Ordering::SeqCst);
                let mut current = self.inner.get_product(&product.id, &product.scope).await?;
                current.stock_quantity = current.stock_quantity.saturating_sub(2);
                self.inner.update_product(&current, current.version).await?;
            }
            self.inner.update_product(product, expected_version).await
        }

        async fn upsert_product(&self, product: &Product) -> store::Result<()> {
            self.inner.upsert_product(product).await
        }

        async fn upsert_supplier(&self, supplier: &common::Supplier) -> store::Result<()> {
            self.inner.upsert_supplier(supplier).await
        }

        async fn list_products(&self, scope: &StoreScope) -> store::Result<Vec<Product>> {
            self.inner.list_products(scope).await
        }
    }

    #[tokio::test]
    async fn commit_retries_after_losing_version_race() {
        let inner = InMemoryCatalogStore::new();
        let apple = Product::new(
            "prod_001",
            "Apple",
            "Fruit",
            Money::from_cents(350),
            20,
            "sup_1",
            "norwood",
        );
        inner.upsert_product(&apple).await.unwrap();

        let catalog = RacingCatalog {
            inner: inner.clone(),
            races_left: Arc::new(AtomicU32::new(1)),
        };
        let engine = OrderEngine::new(
            catalog,
            InMemoryOrderStore::new(),
            InMemoryArtifactGenerator::new(),
        );

        // The concurrent writer takes 2 units first; the engine re-reads
        // and decrements the remaining 18 by 5.
        let placement = engine.place_order(&apple_order(5), false).await.unwrap();
        assert!(matches!(placement, Placement::Placed { .. }));
        assert_eq!(stock_of(&inner).await, 13);
    }

    #[tokio::test]
    async fn commit_gives_up_after_repeated_conflicts() {
        let inner = InMemoryCatalogStore::new();
        let apple = Product::new(
            "prod_001",
            "Apple",
            "Fruit",
            Money::from_cents(350),
            20,
            "sup_1",
            "norwood",
        );
        inner.upsert_product(&apple).await.unwrap();

        let catalog = RacingCatalog {
            inner,
            races_left: Arc::new(AtomicU32::new(10)),
        };
        let engine = OrderEngine::new(
            catalog,
            InMemoryOrderStore::new(),
            InMemoryArtifactGenerator::new(),
        );

        let result = engine.place_order(&apple_order(5), false).await;
        assert!(matches!(result, Err(EngineError::Conflict { attempts, .. }) if attempts == 3));
    }

    #[tokio::test]
    async fn retried_commit_rebuilds_warnings_from_committed_stock() {
        let inner = InMemoryCatalogStore::new();
        let apple = Product::new(
            "prod_001",
            "Apple",
            "Fruit",
            Money::from_cents(350),
            20,
            "sup_1",
            "norwood",
        );
        inner.upsert_product(&apple).await.unwrap();

        let catalog = RacingCatalog {
            inner: inner.clone(),
            races_left: Arc::new(AtomicU32::new(1)),
        };
        let engine = OrderEngine::new(
            catalog,
            InMemoryOrderStore::new(),
            InMemoryArtifactGenerator::new(),
        );

        // 25 requested against 20 staged, but a concurrent writer takes 2
        // units before the commit lands: only 18 can be fulfilled. The
        // warnings must name the final 7-unit shortfall once, not the
        // staging-time 5 plus a second notice.
        let placement = engine.place_order(&apple_order(25), true).await.unwrap();
        match placement {
            Placement::Placed { warnings, .. } => {
                assert_eq!(
                    warnings,
                    vec![
                        "Pre-order placed for 7 unit(s)".to_string(),
                        "Low stock alert: Apple (0 left)".to_string(),
                    ]
                );
            }
            other => panic!("expected placement, got {other:?}"),
        }
        assert_eq!(stock_of(&inner).await, 0);
    }
}
