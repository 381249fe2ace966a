//! HTTP-level integration tests for the `/api/v1/products` endpoints.
//!
//! Requests go straight to the router via `tower::ServiceExt`, backed by
//! the in-memory product store.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{body_json, delete, get, post_json, put_json, send};
use inventory_db::MemoryProductStore;
use serde_json::{json, Value};

fn setup() -> (Router, Arc<MemoryProductStore>) {
    let store = Arc::new(MemoryProductStore::new());
    (common::build_test_app(store.clone()), store)
}

async fn create(app: &Router, body: Value) -> Value {
    let response = post_json(app.clone(), "/api/v1/products", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn list_names(app: &Router, query: &str) -> Vec<String> {
    let response = get(app.clone(), &format!("/api/v1/products{query}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

/// Three products with distinct facets, created oldest first.
async fn seed_catalog(app: &Router) {
    create(
        app,
        json!({"name": "Widget", "price": 100, "category": "tools",
               "size": ["m"], "color": ["red"]}),
    )
    .await;
    create(
        app,
        json!({"name": "Gadget", "price": 250.5, "category": "Electronics",
               "size": ["l", "xl"], "color": ["blue"]}),
    )
    .await;
    create(
        app,
        json!({"name": "Widget Pro", "price": 900, "category": "tools",
               "size": ["xl"], "color": ["red", "black"]}),
    )
    .await;
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_201_with_defaults_applied() {
    let (app, _) = setup();
    let response = post_json(
        app,
        "/api/v1/products",
        json!({"name": "Lamp", "category": "Home", "desc": "warm light"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    let product = &json["data"];
    assert!(product["id"].is_string());
    assert_eq!(product["name"], "Lamp");
    assert_eq!(product["category"], "home");
    assert_eq!(product["description"], "warm light");
    assert_eq!(product["price"], 0.0);
    assert_eq!(product["image"], "default.png");
    assert_eq!(product["size"], json!([]));
    assert!(product["createdAt"].is_string());
}

#[tokio::test]
async fn get_by_id_returns_the_product() {
    let (app, _) = setup();
    let created = create(&app, json!({"name": "Lamp", "category": "home"})).await;
    let id = created["id"].as_str().unwrap();

    let response = get(app, &format!("/api/v1/products/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], created);
}

#[tokio::test]
async fn get_unknown_or_malformed_id_returns_404() {
    let (app, _) = setup();

    let unknown = get(
        app.clone(),
        "/api/v1/products/0190a0a0-0000-7000-8000-000000000000",
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    let json = body_json(unknown).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");

    let malformed = get(app, "/api/v1/products/not-an-id").await;
    assert_eq!(malformed.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_merges_supplied_fields() {
    let (app, _) = setup();
    let created = create(
        &app,
        json!({"name": "Lamp", "price": 20, "category": "home", "color": ["white"]}),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(
        app.clone(),
        &format!("/api/v1/products/{id}"),
        json!({"price": 25}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["price"], 25.0);
    assert_eq!(updated["name"], "Lamp");
    assert_eq!(updated["color"], json!(["white"]));
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let fetched = body_json(get(app, &format!("/api/v1/products/{id}")).await).await;
    assert_eq!(fetched["data"]["price"], 25.0);
}

#[tokio::test]
async fn update_with_blank_image_and_description_restores_defaults() {
    let (app, _) = setup();
    let created = create(
        &app,
        json!({"name": "Lamp", "category": "home", "image": "lamp.png", "desc": "warm"}),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(
        app,
        &format!("/api/v1/products/{id}"),
        json!({"image": "", "description": "  "}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["image"], "default.png");
    assert_eq!(updated["description"], Value::Null);
}

#[tokio::test]
async fn update_unknown_id_returns_404() {
    let (app, _) = setup();
    let response = put_json(app, "/api/v1/products/missing", json!({"price": 1})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_rejects_blank_name() {
    let (app, _) = setup();
    let created = create(&app, json!({"name": "Lamp", "category": "home"})).await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(app, &format!("/api/v1/products/{id}"), json!({"name": "  "})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (app, _) = setup();
    let created = create(&app, json!({"name": "Lamp", "category": "home"})).await;
    let uri = format!("/api/v1/products/{}", created["id"].as_str().unwrap());

    for _ in 0..2 {
        let response = delete(app.clone(), &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"success": true}));
    }

    let response = delete(app.clone(), "/api/v1/products/not-an-id").await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(get(app, &uri).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_without_name_returns_400() {
    let (app, _) = setup();
    let response = post_json(
        app.clone(),
        "/api/v1/products",
        json!({"price": 5, "category": "tools"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "name is required");

    assert!(list_names(&app, "").await.is_empty());
}

#[tokio::test]
async fn create_with_negative_price_returns_400() {
    let (app, _) = setup();
    let response = post_json(
        app,
        "/api/v1/products",
        json!({"name": "Lamp", "price": -1, "category": "home"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let (app, _) = setup();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/products")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unfiltered_listing_is_newest_first() {
    let (app, _) = setup();
    seed_catalog(&app).await;

    assert_eq!(
        list_names(&app, "").await,
        vec!["Widget Pro", "Gadget", "Widget"]
    );
}

#[tokio::test]
async fn search_is_case_insensitive_substring() {
    let (app, _) = setup();
    seed_catalog(&app).await;

    assert_eq!(
        list_names(&app, "?search=WIDG").await,
        vec!["Widget Pro", "Widget"]
    );
    assert_eq!(list_names(&app, "?search=%20%20").await.len(), 3);
}

#[tokio::test]
async fn list_facets_match_any_listed_value() {
    let (app, _) = setup();
    seed_catalog(&app).await;

    assert_eq!(
        list_names(&app, "?size=m,l").await,
        vec!["Gadget", "Widget"]
    );
    assert_eq!(
        list_names(&app, "?color=black,blue").await,
        vec!["Widget Pro", "Gadget"]
    );
    assert_eq!(
        list_names(&app, "?category=ELECTRONICS").await,
        vec!["Gadget"]
    );
}

#[tokio::test]
async fn facets_combine_with_and() {
    let (app, _) = setup();
    seed_catalog(&app).await;

    assert_eq!(
        list_names(&app, "?search=widget&color=red&size=xl").await,
        vec!["Widget Pro"]
    );
    assert!(list_names(&app, "?category=tools&color=blue").await.is_empty());
}

#[tokio::test]
async fn price_bounds_are_inclusive() {
    let (app, _) = setup();
    seed_catalog(&app).await;

    assert_eq!(
        list_names(&app, "?minPrice=100&maxPrice=250.5").await,
        vec!["Gadget", "Widget"]
    );
    assert_eq!(list_names(&app, "?minPrice=900").await, vec!["Widget Pro"]);
}

#[tokio::test]
async fn inverted_price_range_matches_nothing() {
    let (app, _) = setup();
    seed_catalog(&app).await;

    assert!(list_names(&app, "?minPrice=500&maxPrice=100")
        .await
        .is_empty());
}

#[tokio::test]
async fn malformed_price_bound_is_ignored() {
    let (app, _) = setup();
    seed_catalog(&app).await;

    assert_eq!(list_names(&app, "?minPrice=cheap").await.len(), 3);
    assert_eq!(
        list_names(&app, "?minPrice=abc&maxPrice=200").await,
        vec!["Widget"]
    );
}

#[tokio::test]
async fn repeated_keys_are_read_as_one_list() {
    let (app, _) = setup();
    seed_catalog(&app).await;

    assert_eq!(
        list_names(&app, "?size=m&size=l").await,
        vec!["Gadget", "Widget"]
    );
    assert_eq!(
        list_names(&app, "?minPrice=1&minPrice=2&maxPrice=300").await,
        vec!["Gadget", "Widget"]
    );
}

#[tokio::test]
async fn listing_is_repeatable() {
    let (app, _) = setup();
    seed_catalog(&app).await;

    let first = list_names(&app, "?color=red").await;
    let second = list_names(&app, "?color=red").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn price_window_includes_and_excludes_new_product() {
    let (app, _) = setup();
    create(
        &app,
        json!({"name": "Widget", "category": "tools", "price": 100}),
    )
    .await;

    assert_eq!(
        list_names(&app, "?minPrice=50&maxPrice=200").await,
        vec!["Widget"]
    );
    assert!(list_names(&app, "?minPrice=150").await.is_empty());
}

#[tokio::test]
async fn created_product_is_found_by_matching_filters() {
    let (app, _) = setup();
    create(
        &app,
        json!({"name": "Widget", "price": 120, "category": "tools",
               "size": ["m"], "color": ["green"]}),
    )
    .await;

    let names = list_names(
        &app,
        "?search=wid&size=m&color=green&category=tools&minPrice=100&maxPrice=150",
    )
    .await;
    assert_eq!(names, vec!["Widget"]);
}

// ---------------------------------------------------------------------------
// Store failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_outage_returns_500() {
    let (app, store) = setup();
    store.set_available(false);

    let response = get(app, "/api/v1/products").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "STORE_UNAVAILABLE");
}
