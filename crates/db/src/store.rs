//! [`ProductStore`] backed by PostgreSQL.

use async_trait::async_trait;
use inventory_core::error::CoreError;
use inventory_core::filter::ProductFilter;
use inventory_core::product::{parse_product_id, NewProduct, Product, ProductPatch};
use inventory_core::store::ProductStore;

use crate::repositories::ProductRepo;
use crate::DbPool;

/// Product store that owns a connection pool.
#[derive(Clone)]
pub struct PgProductStore {
    pool: DbPool,
}

impl PgProductStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, CoreError> {
        let rows = ProductRepo::list(&self.pool, filter)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, CoreError> {
        let Some(id) = parse_product_id(id) else {
            return Ok(None);
        };
        let row = ProductRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?;
        Ok(row.map(Product::from))
    }

    async fn create(&self, input: NewProduct) -> Result<Product, CoreError> {
        let row = ProductRepo::create(&self.pool, &input)
            .await
            .map_err(store_error)?;
        Ok(row.into())
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, CoreError> {
        let Some(id) = parse_product_id(id) else {
            return Ok(None);
        };
        let row = ProductRepo::update(&self.pool, id, &patch)
            .await
            .map_err(store_error)?;
        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: &str) -> Result<bool, CoreError> {
        let Some(id) = parse_product_id(id) else {
            return Ok(false);
        };
        ProductRepo::delete(&self.pool, id)
            .await
            .map_err(store_error)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(store_error)
    }
}

fn store_error(err: sqlx::Error) -> CoreError {
    CoreError::StoreUnavailable(err.to_string())
}
