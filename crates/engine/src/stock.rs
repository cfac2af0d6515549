//! Manual stock adjustments.

use common::{ProductId, StoreScope};
use store::{CatalogStore, StoreError};

use crate::error::{EngineError, Result};

const MAX_ADJUST_ATTEMPTS: u32 = 3;

/// Applies a signed delta to a product's stock, clamping at zero.
///
/// Restocks pass a positive delta; shrinkage and spoilage write-offs a
/// negative one. A write-off larger than what is on hand empties the
/// shelf rather than going negative. Returns the new stock level.
#[tracing::instrument(skip(catalog))]
pub async fn adjust_stock<C: CatalogStore>(
    catalog: &C,
    product_id: &ProductId,
    scope: &StoreScope,
    delta: i64,
) -> Result<u32> {
    for _attempt in 0..MAX_ADJUST_ATTEMPTS {
        let product = catalog.get_product(product_id, scope).await?;

        let adjusted = (product.stock_quantity as i64 + delta).max(0);
        let mut updated = product.clone();
        updated.stock_quantity = adjusted as u32;

        match catalog.update_product(&updated, product.version).await {
            Ok(_) => {
                tracing::debug!(%product_id, delta, new_stock = updated.stock_quantity, "stock adjusted");
                return Ok(updated.stock_quantity);
            }
            Err(StoreError::VersionConflict { .. }) => {
                metrics::counter!("stock_version_conflicts_total").increment(1);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(EngineError::Conflict {
        product_id: product_id.clone(),
        attempts: MAX_ADJUST_ATTEMPTS,
    })
}
