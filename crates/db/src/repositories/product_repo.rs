//! Repository for the `products` table.
//!
//! Listing translates a [`ProductFilter`] into a parameterized WHERE clause:
//!
//! | Facet      | SQL                              |
//! |------------|----------------------------------|
//! | search     | `name ILIKE $n ESCAPE '\'`       |
//! | sizes      | `size && $n::text[]`             |
//! | colors     | `color && $n::text[]`            |
//! | categories | `category = ANY($n::text[])`     |
//! | min_price  | `price >= $n`                    |
//! | max_price  | `price <= $n`                    |

use inventory_core::filter::ProductFilter;
use inventory_core::product::{NewProduct, ProductPatch, DEFAULT_IMAGE};
use inventory_core::types::ProductId;
use sqlx::PgPool;

use crate::models::product::ProductRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, price, category, description, image, size, color, created_at, updated_at";

/// Newest first; the id tiebreak keeps repeated listings identical.
const LIST_ORDER: &str = "ORDER BY created_at DESC, id DESC";

/// Provides CRUD and filtered listing for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    ///
    /// Ids are UUIDv7, so `id DESC` also orders rows created within the same
    /// timestamp newest first.
    pub async fn create(pool: &PgPool, input: &NewProduct) -> Result<ProductRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (id, name, price, category, description, image, size, color)
             VALUES ($1, $2, COALESCE($3, 0), $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(ProductId::now_v7())
            .bind(&input.name)
            .bind(input.price)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.image.as_deref().unwrap_or(DEFAULT_IMAGE))
            .bind(&input.size)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    /// Find a product by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: ProductId,
    ) -> Result<Option<ProductRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every product matching `filter`, most recently created first.
    pub async fn list(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<ProductRow>, sqlx::Error> {
        let (where_clause, bind_values) = build_product_filter(filter);
        let query = format!("SELECT {COLUMNS} FROM products {where_clause} {LIST_ORDER}");

        tracing::debug!(%where_clause, binds = bind_values.len(), "Listing products");

        bind_filter_values(sqlx::query_as::<_, ProductRow>(&query), &bind_values)
            .fetch_all(pool)
            .await
    }

    /// Update a product. Only non-`None` fields in `input` are applied; an
    /// empty `description` clears the column.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: ProductId,
        input: &ProductPatch,
    ) -> Result<Option<ProductRow>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE($2, name),
                price = COALESCE($3, price),
                category = COALESCE($4, category),
                description = CASE WHEN $5::text IS NULL THEN description ELSE NULLIF($5, '') END,
                image = COALESCE($6, image),
                size = COALESCE($7, size),
                color = COALESCE($8, color),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.price)
            .bind(&input.category)
            .bind(&input.description)
            .bind(&input.image)
            .bind(&input.size)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a product by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: ProductId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built listing queries.
#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    Text(String),
    TextArray(Vec<String>),
    Float(f64),
}

/// Build a WHERE clause and bind values from a [`ProductFilter`].
///
/// The clause is empty when the filter is unconstrained, otherwise it starts
/// with `WHERE ` and joins every active facet with `AND`.
fn build_product_filter(filter: &ProductFilter) -> (String, Vec<BindValue>) {
    if filter.is_unconstrained() {
        return (String::new(), Vec::new());
    }

    let mut conditions: Vec<String> = Vec::new();
    let mut bind_values: Vec<BindValue> = Vec::new();
    let mut bind_idx = 1u32;

    if let Some(ref search) = filter.search {
        conditions.push(format!("name ILIKE ${bind_idx} ESCAPE '\\'"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{}%", escape_like(search))));
    }

    if !filter.sizes.is_empty() {
        conditions.push(format!("size && ${bind_idx}::text[]"));
        bind_idx += 1;
        bind_values.push(BindValue::TextArray(filter.sizes.clone()));
    }

    if !filter.colors.is_empty() {
        conditions.push(format!("color && ${bind_idx}::text[]"));
        bind_idx += 1;
        bind_values.push(BindValue::TextArray(filter.colors.clone()));
    }

    if !filter.categories.is_empty() {
        conditions.push(format!("category = ANY(${bind_idx}::text[])"));
        bind_idx += 1;
        bind_values.push(BindValue::TextArray(filter.categories.clone()));
    }

    if let Some(min) = filter.min_price {
        conditions.push(format!("price >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Float(min));
    }

    if let Some(max) = filter.max_price {
        conditions.push(format!("price <= ${bind_idx}"));
        bind_values.push(BindValue::Float(max));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_filter_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::TextArray(v) => q = q.bind(v.as_slice()),
            BindValue::Float(v) => q = q.bind(*v),
        }
    }
    q
}

/// Escape `LIKE` metacharacters so the search text matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
