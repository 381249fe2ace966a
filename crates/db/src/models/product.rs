//! Row mapping for the `products` table.

use inventory_core::product::Product;
use inventory_core::types::{ProductId, Timestamp};
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: Option<String>,
    pub image: String,
    pub size: Vec<String>,
    pub color: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id.to_string(),
            name: row.name,
            price: row.price,
            category: row.category,
            description: row.description,
            image: row.image,
            size: row.size,
            color: row.color,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
