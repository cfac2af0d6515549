//! Product and supplier catalog records.

use serde::{Deserialize, Serialize};

use crate::{Money, ProductId, StoreScope, SupplierId, Version};

/// A product record in the catalog.
///
/// `stock_quantity` is never negative: the order engine only commits
/// decrements it has validated against the current stock, and manual
/// adjustments clamp at zero. The `version` field is the
/// optimistic-concurrency token checked by conditional updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog key.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Category label (e.g. "Fruit", "Dairy").
    pub category: String,

    /// Current unit price.
    pub unit_price: Money,

    /// Units currently on hand.
    pub stock_quantity: u32,

    /// Supplier this product is sourced from.
    pub supplier_id: SupplierId,

    /// Retail location this record belongs to.
    pub scope: StoreScope,

    /// Optimistic-concurrency token.
    #[serde(default)]
    pub version: Version,
}

impl Product {
    /// Creates a new product record at the initial version.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        category: impl Into<String>,
        unit_price: Money,
        stock_quantity: u32,
        supplier_id: impl Into<SupplierId>,
        scope: impl Into<StoreScope>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            unit_price,
            stock_quantity,
            supplier_id: supplier_id.into(),
            scope: scope.into(),
            version: Version::initial(),
        }
    }
}

/// A supplier record. Plain upsert data with no invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    /// Supplier key.
    pub id: SupplierId,

    /// Company name.
    pub name: String,

    /// Ordering contact.
    pub contact_email: String,

    /// Category labels this supplier covers.
    pub categories_supplied: Vec<String>,

    /// Retail location this record belongs to.
    pub scope: StoreScope,
}
