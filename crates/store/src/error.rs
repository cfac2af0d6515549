//! Store error types.

use common::{ProductId, StoreScope, Version};
use thiserror::Error;

/// Errors that can occur when interacting with the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional update lost the race: the expected version did not
    /// match the version currently stored.
    #[error(
        "Version conflict for product {product_id}: expected version {expected}, found {actual}"
    )]
    VersionConflict {
        product_id: ProductId,
        expected: Version,
        actual: Version,
    },

    /// The referenced product does not exist in the given scope.
    #[error("Product not found: {product_id} (scope {scope})")]
    ProductNotFound {
        product_id: ProductId,
        scope: StoreScope,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store is unreachable or failed in a retryable way.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
