//! Order records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Money, OrderId, ProductId, StoreScope};

/// The customer an order was placed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
}

impl Customer {
    /// Creates a new customer.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A line item within an order.
///
/// Product name and unit price are snapshots taken at order time, so a
/// historical order does not change when the catalog is repriced or
/// renamed later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Weak reference to the catalog product (lookup only, no ownership).
    pub product_id: ProductId,

    /// Product name at order time.
    pub product_name: String,

    /// Quantity ordered. Always positive.
    pub quantity: u32,

    /// Unit price at order time.
    pub unit_price: Money,
}

impl OrderLineItem {
    /// Creates a new line item.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (quantity * unit price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A placed order. Append-only: created once by the order engine,
/// atomically with the stock mutations it implies, never mutated after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Identifier derived from order date and customer email.
    pub id: OrderId,

    /// The day the order was placed.
    pub order_date: NaiveDate,

    /// Who placed the order.
    pub customer: Customer,

    /// Line items, in submission order.
    pub items: Vec<OrderLineItem>,

    /// Sum of all line totals.
    pub order_total: Money,

    /// Retail location this order belongs to.
    pub scope: StoreScope,
}

impl Order {
    /// Builds an order for a customer on a date, deriving the order ID and
    /// computing the total from the line items.
    pub fn new(
        order_date: NaiveDate,
        customer: Customer,
        items: Vec<OrderLineItem>,
        scope: impl Into<StoreScope>,
    ) -> Self {
        let id = OrderId::derive(order_date, &customer.email);
        let order_total = items.iter().map(OrderLineItem::line_total).sum();
        Self {
            id,
            order_date,
            customer,
            items,
            order_total,
            scope: scope.into(),
        }
    }

    /// Returns the total number of units across all line items.
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| item.quantity as u64).sum()
    }
}
