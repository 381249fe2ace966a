/// Domain-level errors shared by every store backend and the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backing store could not be reached or rejected the query.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CoreError {
    /// Shorthand for a missing product.
    pub fn product_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: "Product",
            id: id.into(),
        }
    }
}
