//! Engine error types.

use common::ProductId;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by the engines.
///
/// Policy rejections (oversell without preorder) are *not* errors: they
/// are returned as [`Placement::Rejected`](crate::Placement::Rejected).
/// Everything here is either a malformed request or a fault.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A line item references a product that does not exist.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    /// The order is structurally invalid (empty, or a zero quantity).
    #[error("Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// A stock commit kept losing the version race. Transient: the caller
    /// may retry the whole placement.
    #[error("Stock update for {product_id} still conflicting after {attempts} attempts")]
    Conflict { product_id: ProductId, attempts: u32 },

    /// A store I/O fault, propagated.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ProductNotFound { product_id, .. } => {
                EngineError::ProductNotFound { product_id }
            }
            other => EngineError::Store(other),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
