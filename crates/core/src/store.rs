//! The persistence seam used by the HTTP layer.
//!
//! Implementations own their connection resources; the API holds one behind
//! an `Arc<dyn ProductStore>` in its state. Inputs reaching a store have
//! already been validated.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::filter::ProductFilter;
use crate::product::{NewProduct, Product, ProductPatch};

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products matching `filter`, newest first.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, CoreError>;

    /// Look up a product. Identifiers that cannot resolve yield `None`.
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, CoreError>;

    async fn create(&self, input: NewProduct) -> Result<Product, CoreError>;

    /// Merge `patch` onto the stored record. `None` if `id` does not resolve.
    async fn update(&self, id: &str, patch: ProductPatch) -> Result<Option<Product>, CoreError>;

    /// Remove a product. Returns whether a record was actually removed.
    async fn delete(&self, id: &str) -> Result<bool, CoreError>;

    /// Cheap reachability probe for health reporting.
    async fn ping(&self) -> Result<(), CoreError>;
}
