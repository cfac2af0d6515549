//! Starter catalog for a fresh store.

use common::{Money, Product, StoreScope, Supplier};
use store::{CatalogStore, Result};

/// Default stock level for every seeded product.
pub const SEED_STOCK: u32 = 20;

/// Scope the seed catalog belongs to.
pub const SEED_SCOPE: &str = "norwood";

/// Returns the seed product catalog: twelve staples across five
/// categories, all at the same starting stock.
pub fn seed_products() -> Vec<Product> {
    let product = |id, name, category, cents, supplier| {
        Product::new(
            id,
            name,
            category,
            Money::from_cents(cents),
            SEED_STOCK,
            supplier,
            SEED_SCOPE,
        )
    };

    vec![
        product("prod_001", "Apple", "Fruit", 350, "sup_1"),
        product("prod_002", "Banana", "Fruit", 280, "sup_1"),
        product("prod_003", "Carrot", "Vegetable", 190, "sup_1"),
        product("prod_004", "Broccoli", "Vegetable", 250, "sup_1"),
        product("prod_005", "Milk", "Dairy", 420, "sup_2"),
        product("prod_006", "Cheese", "Dairy", 550, "sup_2"),
        product("prod_007", "Bread", "Bakery", 300, "sup_3"),
        product("prod_008", "Croissant", "Bakery", 270, "sup_3"),
        product("prod_009", "Rice", "Pantry", 480, "sup_4"),
        product("prod_010", "Pasta", "Pantry", 390, "sup_4"),
        product("prod_011", "Olive Oil", "Pantry", 650, "sup_4"),
        product("prod_012", "Honey", "Pantry", 520, "sup_4"),
    ]
}

/// Returns the seed suppliers, one per produce/dairy/bakery/pantry split.
pub fn seed_suppliers() -> Vec<Supplier> {
    vec![
        Supplier {
            id: "sup_1".into(),
            name: "Green Valley Farms".to_string(),
            contact_email: "orders@greenvalleyfarms.example".to_string(),
            categories_supplied: vec!["Fruit".to_string(), "Vegetable".to_string()],
            scope: StoreScope::new(SEED_SCOPE),
        },
        Supplier {
            id: "sup_2".into(),
            name: "Hillside Dairy Co".to_string(),
            contact_email: "supply@hillsidedairy.example".to_string(),
            categories_supplied: vec!["Dairy".to_string()],
            scope: StoreScope::new(SEED_SCOPE),
        },
        Supplier {
            id: "sup_3".into(),
            name: "Morning Crust Bakery".to_string(),
            contact_email: "wholesale@morningcrust.example".to_string(),
            categories_supplied: vec!["Bakery".to_string()],
            scope: StoreScope::new(SEED_SCOPE),
        },
        Supplier {
            id: "sup_4".into(),
            name: "Pantry Direct".to_string(),
            contact_email: "accounts@pantrydirect.example".to_string(),
            categories_supplied: vec!["Pantry".to_string()],
            scope: StoreScope::new(SEED_SCOPE),
        },
    ]
}

/// Upserts the full seed catalog into a store.
///
/// Upsert semantics make this safe to run against a store that was
/// already seeded; it resets the seeded records to their initial state.
#[tracing::instrument(skip(catalog))]
pub async fn apply_seed<C: CatalogStore>(catalog: &C) -> Result<()> {
    for supplier in seed_suppliers() {
        catalog.upsert_supplier(&supplier).await?;
    }
    for product in seed_products() {
        catalog.upsert_product(&product).await?;
    }
    tracing::info!(scope = SEED_SCOPE, "seed catalog applied");
    Ok(())
}
