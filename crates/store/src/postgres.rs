//! PostgreSQL-backed store implementations.
//!
//! All three stores share one [`PgPool`], built once from
//! [`PostgresConfig`](crate::PostgresConfig) and injected at construction.
//! Schema lives in `migrations/` at the workspace root.

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{
    Customer, DailySummary, Money, Order, OrderId, OrderLineItem, Product, ProductId, StoreScope,
    Supplier, SupplierId, Version,
};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{CatalogStore, InsertOutcome, OrderStore, Result, StoreError, SummaryStore};

/// PostgreSQL catalog store.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new catalog store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            stock_quantity: row.try_get::<i32, _>("stock_quantity")? as u32,
            supplier_id: SupplierId::new(row.try_get::<String, _>("supplier_id")?),
            scope: StoreScope::new(row.try_get::<String, _>("scope")?),
            version: Version::new(row.try_get("version")?),
        })
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn get_product(&self, id: &ProductId, scope: &StoreScope) -> Result<Product> {
        let row = sqlx::query(
            r#"
            SELECT id, name, category, unit_price_cents, stock_quantity, supplier_id, scope, version
            FROM products
            WHERE id = $1 AND scope = $2
            "#,
        )
        .bind(id.as_str())
        .bind(scope.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(StoreError::ProductNotFound {
                product_id: id.clone(),
                scope: scope.clone(),
            }),
        }
    }

    async fn update_product(
        &self,
        product: &Product,
        expected_version: Version,
    ) -> Result<Version> {
        let new_version = expected_version.next();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $3, category = $4, unit_price_cents = $5,
                stock_quantity = $6, supplier_id = $7, version = $8
            WHERE id = $1 AND scope = $2 AND version = $9
            "#,
        )
        .bind(product.id.as_str())
        .bind(product.scope.as_str())
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.unit_price.cents())
        .bind(product.stock_quantity as i32)
        .bind(product.supplier_id.as_str())
        .bind(new_version.as_i64())
        .bind(expected_version.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(new_version);
        }

        // The conditional write missed. Re-read to tell a lost race apart
        // from a missing record.
        let actual: Option<i64> =
            sqlx::query_scalar("SELECT version FROM products WHERE id = $1 AND scope = $2")
                .bind(product.id.as_str())
                .bind(product.scope.as_str())
                .fetch_optional(&self.pool)
                .await?;

        match actual {
            Some(actual) => Err(StoreError::VersionConflict {
                product_id: product.id.clone(),
                expected: expected_version,
                actual: Version::new(actual),
            }),
            None => Err(StoreError::ProductNotFound {
                product_id: product.id.clone(),
                scope: product.scope.clone(),
            }),
        }
    }

    async fn upsert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, scope, name, category, unit_price_cents, stock_quantity, supplier_id, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id, scope) DO UPDATE SET
                name = EXCLUDED.name,
                category = EXCLUDED.category,
                unit_price_cents = EXCLUDED.unit_price_cents,
                stock_quantity = EXCLUDED.stock_quantity,
                supplier_id = EXCLUDED.supplier_id,
                version = EXCLUDED.version
            "#,
        )
        .bind(product.id.as_str())
        .bind(product.scope.as_str())
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.unit_price.cents())
        .bind(product.stock_quantity as i32)
        .bind(product.supplier_id.as_str())
        .bind(product.version.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<()> {
        let categories = serde_json::to_value(&supplier.categories_supplied)?;

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, scope, name, contact_email, categories_supplied)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id, scope) DO UPDATE SET
                name = EXCLUDED.name,
                contact_email = EXCLUDED.contact_email,
                categories_supplied = EXCLUDED.categories_supplied
            "#,
        )
        .bind(supplier.id.as_str())
        .bind(supplier.scope.as_str())
        .bind(&supplier.name)
        .bind(&supplier.contact_email)
        .bind(categories)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_products(&self, scope: &StoreScope) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, category, unit_price_cents, stock_quantity, supplier_id, scope, version
            FROM products
            WHERE scope = $1
            ORDER BY id ASC
            "#,
        )
        .bind(scope.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }
}

/// PostgreSQL order store.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new order store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let items: Vec<OrderLineItem> = serde_json::from_value(row.try_get("items")?)?;
        Ok(Order {
            id: OrderId::new(row.try_get::<String, _>("id")?),
            order_date: row.try_get("order_date")?,
            customer: Customer {
                name: row.try_get("customer_name")?,
                email: row.try_get("customer_email")?,
            },
            items,
            order_total: Money::from_cents(row.try_get("order_total_cents")?),
            scope: StoreScope::new(row.try_get::<String, _>("scope")?),
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn put_order(&self, order: &Order) -> Result<()> {
        let items = serde_json::to_value(&order.items)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_date, scope, customer_name, customer_email, items, order_total_cents)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                order_date = EXCLUDED.order_date,
                scope = EXCLUDED.scope,
                customer_name = EXCLUDED.customer_name,
                customer_email = EXCLUDED.customer_email,
                items = EXCLUDED.items,
                order_total_cents = EXCLUDED.order_total_cents
            "#,
        )
        .bind(order.id.as_str())
        .bind(order.order_date)
        .bind(order.scope.as_str())
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(items)
        .bind(order.order_total.cents())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn orders_for_date(&self, date: NaiveDate) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_date, scope, customer_name, customer_email, items, order_total_cents
            FROM orders
            WHERE order_date = $1
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }
}

/// PostgreSQL summary store.
#[derive(Clone)]
pub struct PostgresSummaryStore {
    pool: PgPool,
}

impl PostgresSummaryStore {
    /// Creates a new summary store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryStore for PostgresSummaryStore {
    async fn insert_if_absent(&self, summary: &DailySummary) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO daily_summary (summary_date, total_orders, total_revenue_cents, most_popular_product)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (summary_date) DO NOTHING
            "#,
        )
        .bind(summary.date)
        .bind(summary.total_orders as i64)
        .bind(summary.total_revenue.cents())
        .bind(summary.most_popular_product.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::AlreadyExists)
        }
    }

    async fn get(&self, date: NaiveDate) -> Result<Option<DailySummary>> {
        let row = sqlx::query(
            r#"
            SELECT summary_date, total_orders, total_revenue_cents, most_popular_product
            FROM daily_summary
            WHERE summary_date = $1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(DailySummary {
                date: row.try_get("summary_date")?,
                total_orders: row.try_get::<i64, _>("total_orders")? as u64,
                total_revenue: Money::from_cents(row.try_get("total_revenue_cents")?),
                most_popular_product: row.try_get("most_popular_product")?,
            })),
            None => Ok(None),
        }
    }
}
