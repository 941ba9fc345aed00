//! Integration tests for API endpoints.
//!
//! Requests go through the full router (rate limits, access guards,
//! extractors) backed by in-memory collaborators.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{json_body, TestApp, FRONTEND_URL};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn mask_body(stock: i32) -> Value {
    json!({
        "name": "Gelede Mask",
        "description": "Carved wooden mask",
        "price": 120.0,
        "category": "mask",
        "origin": "Nigeria",
        "artist": "Ade",
        "stock": stock,
        "tags": ["yoruba"]
    })
}

async fn create_mask(app: &TestApp, token: &str, stock: i32) -> Value {
    let response = app
        .send(json_request(Method::POST, "/products", Some(token), mask_body(stock)))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string()
}

// =============================================================================
// Root and health
// =============================================================================

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::new();

    let response = app.send(get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["redis"]["status"], "healthy");
}

// =============================================================================
// Public catalog
// =============================================================================

#[tokio::test]
async fn test_empty_catalog_lists_zero_pages() {
    let app = TestApp::new();

    let response = app.send(get("/products")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-RateLimit-Limit"));

    let body = json_body(response).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["pagination"]["pages"], 0);
}

#[tokio::test]
async fn test_listing_rejects_out_of_range_limit() {
    let app = TestApp::new();

    let response = app.send(get("/products?limit=500")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_listing_rejects_unknown_sort_field() {
    let app = TestApp::new();

    let response = app.send(get("/products?sortBy=password")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_rejects_unknown_sort_order() {
    let app = TestApp::new();

    let response = app.send(get("/products?sortOrder=sideways")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(get("/products?sortOrder=asc")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_category_is_bad_request() {
    let app = TestApp::new();

    let response = app.send(get("/products/category/spaceship")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_product_with_malformed_id() {
    let app = TestApp::new();

    let response = app.send(get("/products/not-a-uuid")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "Invalid product ID");
}

#[tokio::test]
async fn test_get_missing_product_is_not_found() {
    let app = TestApp::new();

    let response = app.send(get(&format!("/products/{}", Uuid::new_v4()))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// Access guards
// =============================================================================

#[tokio::test]
async fn test_create_without_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app
        .send(json_request(Method::POST, "/products", None, mask_body(3)))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_with_garbage_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            Method::POST,
            "/products",
            Some("not.a.jwt"),
            mask_body(3),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_token_cannot_reach_admin_routes() {
    let app = TestApp::new();
    let token = app.user_token().await;

    let response = app
        .send(json_request(Method::POST, "/products", Some(&token), mask_body(3)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(get_with_token("/products/admin/stats", &token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Admin catalog management
// =============================================================================

#[tokio::test]
async fn test_admin_creates_and_reads_product() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let created = create_mask(&app, &token, 3).await;
    assert_eq!(created["status"], "active");
    assert_eq!(created["viewCount"], 0);
    assert!(created["addedBy"]["email"]
        .as_str()
        .unwrap()
        .starts_with("curator-"));
    assert!(created["lastModifiedBy"].is_null());

    let id = created["id"].as_str().unwrap();
    let response = app.send(get(&format!("/products/{}", id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = json_body(response).await;
    assert_eq!(fetched["name"], "Gelede Mask");

    let response = app.send(get("/products/category/mask")).await;
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_rejects_negative_price() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let mut body = mask_body(1);
    body["price"] = json!(-5.0);
    let response = app
        .send(json_request(Method::POST, "/products", Some(&token), body))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_records_modifier() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    let created = create_mask(&app, &token, 3).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .send(json_request(
            Method::PATCH,
            &format!("/products/{}", id),
            Some(&token),
            json!({ "price": 150.0, "stock": 0 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["price"], 150.0);
    assert_eq!(body["status"], "out_of_stock");
    assert_eq!(body["lastModifiedBy"]["id"], body["addedBy"]["id"]);
}

#[tokio::test]
async fn test_stock_adjustment_cannot_go_negative() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    let created = create_mask(&app, &token, 2).await;
    let uri = format!("/products/{}/stock", created["id"].as_str().unwrap());

    let response = app
        .send(json_request(
            Method::PATCH,
            &uri,
            Some(&token),
            json!({ "quantity": -3 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(json_request(
            Method::PATCH,
            &uri,
            Some(&token),
            json!({ "quantity": -2 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["stock"], 0);
    assert_eq!(body["status"], "out_of_stock");
}

#[tokio::test]
async fn test_stock_adjustment_past_integer_range_is_refused() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    let created = create_mask(&app, &token, 5).await;
    let uri = format!("/products/{}/stock", created["id"].as_str().unwrap());

    let response = app
        .send(json_request(
            Method::PATCH,
            &uri,
            Some(&token),
            json!({ "quantity": i32::MAX }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let response = app.send(get(&uri.replace("/stock", ""))).await;
    let body = json_body(response).await;
    assert_eq!(body["stock"], 5);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    let created = create_mask(&app, &token, 1).await;
    let uri = format!("/products/{}", created["id"].as_str().unwrap());

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(&uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(get(&uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_stats() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    create_mask(&app, &token, 2).await;
    create_mask(&app, &token, 0).await;

    let response = app.send(get_with_token("/products/admin/stats", &token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["totalProducts"], 2);
    assert_eq!(body["activeProducts"], 1);
    assert_eq!(body["totalStock"], 2);
    assert_eq!(body["categoryStats"][0]["category"], "mask");
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_admin_register_conflict_and_login() {
    let app = TestApp::new();
    let credentials = json!({ "email": "curator@example.com", "password": "s3cret!" });

    let response = app
        .send(json_request(
            Method::POST,
            "/auth/admin/register",
            None,
            credentials.clone(),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["role"], "admin");
    assert!(body.get("passwordHash").is_none());

    let response = app
        .send(json_request(
            Method::POST,
            "/auth/admin/register",
            None,
            credentials.clone(),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .send(json_request(Method::POST, "/auth/admin/login", None, credentials))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["admin"]["email"], "curator@example.com");

    let response = app
        .send(json_request(
            Method::POST,
            "/auth/admin/login",
            None,
            json!({ "email": "curator@example.com", "password": "wrong-one" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            Method::POST,
            "/auth/admin/register",
            None,
            json!({ "email": "curator@example.com", "password": "123" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_returns_principal() {
    let app = TestApp::new();
    let token = app.user_token().await;

    let response = app.send(get_with_token("/auth/profile", &token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["role"], "user");
    assert_eq!(body["accountType"], "user");
    assert_eq!(body["email"], "user@example.com");

    let response = app.send(get("/auth/profile")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_social_login_round_trip() {
    let app = TestApp::new();

    let response = app.send(get("/auth/google")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let consent = location(&response);
    let state = consent.split("state=").nth(1).unwrap().to_string();

    let callback = format!("/auth/google/callback?code=valid-code&state={}", state);
    let response = app.send(get(&callback)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with(&format!("{}/auth/success?token=", FRONTEND_URL)));
    assert_eq!(app.store.users.count(), 1);

    // A state value is single use
    let response = app.send(get(&callback)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_rejects_state_from_other_provider() {
    let app = TestApp::new();

    let response = app.send(get("/auth/facebook")).await;
    let consent = location(&response);
    let state = consent.split("state=").nth(1).unwrap().to_string();

    let response = app
        .send(get(&format!(
            "/auth/google/callback?code=valid-code&state={}",
            state
        )))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.users.count(), 0);
}

#[tokio::test]
async fn test_unknown_provider_is_bad_request() {
    let app = TestApp::new();

    let response = app.send(get("/auth/twitter")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let app = TestApp::new();

    let mut last = StatusCode::OK;
    for _ in 0..11 {
        let request = Request::builder()
            .uri("/auth/twitter")
            .header("X-Forwarded-For", "203.0.113.9")
            .body(Body::empty())
            .unwrap();
        last = app.send(request).await.status();
    }
    assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);
}
