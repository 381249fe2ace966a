pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /products         list (filtered), create
/// /products/{id}    get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/products", products::router())
}
