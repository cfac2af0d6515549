//! Collaborator store contracts for the GreenLeaf retail core.
//!
//! Three narrow store interfaces, each with an in-memory implementation
//! for tests and a PostgreSQL implementation sharing one connection pool:
//! - [`CatalogStore`] — product and supplier records, with conditional
//!   (version-checked) product rewrites
//! - [`OrderStore`] — placed orders, queryable by date
//! - [`SummaryStore`] — one durable row per summary date, insert-if-absent

pub mod catalog;
pub mod config;
pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod summary;

pub use catalog::CatalogStore;
pub use config::PostgresConfig;
pub use error::{Result, StoreError};
pub use memory::{InMemoryCatalogStore, InMemoryOrderStore, InMemorySummaryStore};
pub use order::OrderStore;
pub use postgres::{PostgresCatalogStore, PostgresOrderStore, PostgresSummaryStore};
pub use summary::{InsertOutcome, SummaryStore};
