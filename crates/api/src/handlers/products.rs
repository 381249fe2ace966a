//! Handlers for the `/products` resource.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use inventory_core::error::CoreError;
use inventory_core::filter::{ProductFilter, ProductQuery};
use inventory_core::product::{NewProduct, Product, ProductPatch};

use crate::error::AppResult;
use crate::response::{DataResponse, SuccessResponse};
use crate::state::AppState;

/// GET /api/v1/products
///
/// Every query parameter is optional; see [`ProductFilter`] for how each
/// facet constrains the listing. Repeated keys are read as one
/// comma-joined list.
pub async fn list(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    let Query(pairs) = pairs?;
    let filter = ProductFilter::from(&ProductQuery::from_pairs(pairs));
    let products = state.store.list(&filter).await?;
    tracing::debug!(count = products.len(), ?filter, "Listed products");
    Ok(Json(DataResponse::new(products)))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| CoreError::product_not_found(&id))?;
    Ok(Json(DataResponse::new(product)))
}

/// POST /api/v1/products
pub async fn create(
    State(state): State<AppState>,
    input: Result<Json<NewProduct>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    let Json(input) = input?;
    let input = input.into_validated()?;
    let product = state.store.create(input).await?;
    tracing::info!(product_id = %product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(product))))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    input: Result<Json<ProductPatch>, JsonRejection>,
) -> AppResult<Json<DataResponse<Product>>> {
    let Json(patch) = input?;
    let patch = patch.into_validated()?;
    let product = state
        .store
        .update(&id, patch)
        .await?
        .ok_or_else(|| CoreError::product_not_found(&id))?;
    tracing::info!(product_id = %product.id, "Product updated");
    Ok(Json(DataResponse::new(product)))
}

/// DELETE /api/v1/products/{id}
///
/// Idempotent: deleting an unknown id still succeeds.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    let removed = state.store.delete(&id).await?;
    if removed {
        tracing::info!(product_id = %id, "Product deleted");
    } else {
        tracing::debug!(product_id = %id, "Delete of unknown product");
    }
    Ok(Json(SuccessResponse::ok()))
}
