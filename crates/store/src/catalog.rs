//! Catalog store contract.

use async_trait::async_trait;
use common::{Product, ProductId, StoreScope, Supplier, Version};

use crate::Result;

/// Keyed store for product and supplier records.
///
/// Product stock is only ever rewritten through [`update_product`], which
/// is conditioned on the record version: if the stored version no longer
/// matches `expected_version` the write is rejected with
/// [`StoreError::VersionConflict`](crate::StoreError::VersionConflict) and
/// the caller must re-read and retry. This is what serializes concurrent
/// decrements of the same product.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetches a product record by ID within a scope.
    ///
    /// Fails with `ProductNotFound` if no such record exists.
    async fn get_product(&self, id: &ProductId, scope: &StoreScope) -> Result<Product>;

    /// Conditionally rewrites a product record.
    ///
    /// The write succeeds only if the stored version equals
    /// `expected_version`; on success the record is stored with the next
    /// version, which is returned.
    async fn update_product(&self, product: &Product, expected_version: Version)
    -> Result<Version>;

    /// Creates or replaces a product record unconditionally.
    ///
    /// Seeding/administration only; order placement never goes through
    /// this path.
    async fn upsert_product(&self, product: &Product) -> Result<()>;

    /// Creates or replaces a supplier record.
    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<()>;

    /// Lists all products within a scope.
    async fn list_products(&self, scope: &StoreScope) -> Result<Vec<Product>>;
}
