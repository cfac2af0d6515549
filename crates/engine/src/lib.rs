//! Order placement and daily-summary engines for the GreenLeaf retail core.
//!
//! Two engines carry all the invariants of the system:
//! - [`OrderEngine`] validates an order against current stock, applies the
//!   preorder policy, commits the stock decrements through conditional
//!   updates with bounded conflict retry, and persists the order record.
//! - [`SummaryEngine`] aggregates one day's orders into a
//!   [`DailySummary`](common::DailySummary), persists it idempotently, and
//!   degrades to an artifact-only result when the aggregate store is
//!   unreachable.
//!
//! Everything else (HTTP, sessions, page rendering, seed CLI) is glue that
//! calls into these engines.

pub mod artifact;
pub mod error;
pub mod order;
pub mod seed;
pub mod stock;
pub mod summary;

pub use artifact::{
    ArtifactError, ArtifactGenerator, ArtifactRef, FileArtifactGenerator, InMemoryArtifactGenerator,
};
pub use error::{EngineError, Result};
pub use order::{OrderEngine, Placement};
pub use seed::{apply_seed, seed_products, seed_suppliers};
pub use stock::adjust_stock;
pub use summary::{SummaryEngine, SummaryOutcome, SummaryReceipt};
