//! Shared record types for the GreenLeaf retail core.
//!
//! This crate provides the value objects and records that the store
//! contracts and engines operate on:
//! - Identifier newtypes ([`ProductId`], [`SupplierId`], [`OrderId`], [`StoreScope`])
//! - [`Money`] in integer cents
//! - [`Version`] for optimistic-concurrency control on catalog records
//! - The [`Product`], [`Supplier`], [`Order`] and [`DailySummary`] records

pub mod ids;
pub mod money;
pub mod order;
pub mod product;
pub mod summary;
pub mod version;

pub use ids::{OrderId, ProductId, StoreScope, SupplierId};
pub use money::Money;
pub use order::{Customer, Order, OrderLineItem};
pub use product::{Product, Supplier};
pub use summary::DailySummary;
pub use version::Version;
