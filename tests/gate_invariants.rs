//! Gate Invariant Tests
//!
//! Drives the full router and checks the ordering and separation of the
//! authentication, authorization and validation stages, plus the response
//! envelope on every path.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;

use gatekeep::auth::crypto::hash_password;
use gatekeep::auth::{JwtConfig, JwtManager, Role};
use gatekeep::http_server::server::build_router;
use gatekeep::http_server::{AppState, HttpServerConfig};
use gatekeep::storage::NewProduct;

const SECRET: &str = "gate_invariants_secret";

struct TestApp {
    router: Router,
    state: Arc<AppState>,
}

impl TestApp {
    fn new() -> Self {
        let state = Arc::new(AppState::in_memory(JwtConfig::new(SECRET)).unwrap());
        let router = build_router(&HttpServerConfig::default(), state.clone());
        Self { router, state }
    }

    fn seed_user(&self, email: &str, role: Role) -> i64 {
        let hash = hash_password("password123").unwrap();
        self.state.users.create(email.to_string(), hash, role).unwrap().id
    }

    fn token_for(&self, email: &str, role: Role) -> String {
        let id = self.seed_user(email, role);
        self.state.jwt.issue(id, role).unwrap()
    }

    fn seed_products(&self, owner: i64, count: usize) {
        for i in 0..count {
            self.state
                .products
                .create(
                    owner,
                    NewProduct {
                        name: format!("Product {}", i),
                        description: None,
                        price: 10.0 + i as f64,
                        category: 1,
                    },
                )
                .unwrap();
        }
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        match body {
            Some(json) => self.send_raw(method, uri, token, json.to_string()).await,
            None => self.send_raw(method, uri, token, Body::empty()).await,
        }
    }

    async fn send_raw(&self, method: Method, uri: &str, token: Option<&str>, body: impl Into<Body>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = self.router.clone().oneshot(builder.body(body.into()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn assert_envelope(status: StatusCode, json: &Value) {
    assert_eq!(json["statusCode"], status.as_u16());
    let success = json["success"].as_bool().unwrap();
    assert_eq!(success, status.is_success());
    if success {
        assert!(json.get("errors").is_none(), "success envelope carries errors: {}", json);
    } else {
        assert!(json.get("data").is_none(), "failure envelope carries data: {}", json);
    }
}

fn valid_product() -> Value {
    json!({"name": "Desk lamp", "price": 25.5, "category": 3})
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_missing_header_is_401_not_403() {
    let app = TestApp::new();
    let (status, json) = app.send(Method::POST, "/api/v1/products", None, Some(valid_product())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Authorization header missing or malformed");
    assert_envelope(status, &json);
}

#[tokio::test]
async fn test_expired_token_is_401() {
    let app = TestApp::new();
    let admin = app.seed_user("admin@example.com", Role::Admin);
    let expired = JwtManager::new(JwtConfig::new(SECRET).with_ttl(Duration::seconds(-60)))
        .issue(admin, Role::Admin)
        .unwrap();

    let (status, json) = app
        .send(Method::POST, "/api/v1/products", Some(&expired), Some(valid_product()))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_401() {
    let app = TestApp::new();
    let forged = JwtManager::new(JwtConfig::new("someone_elses_secret"))
        .issue(1, Role::Admin)
        .unwrap();

    let (status, _) = app.send(Method::DELETE, "/api/v1/products/1", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_wrong_role_is_403() {
    let app = TestApp::new();
    let token = app.token_for("user@example.com", Role::User);

    let (status, json) = app
        .send(Method::POST, "/api/v1/products", Some(&token), Some(valid_product()))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Forbidden: insufficient role");
    assert_envelope(status, &json);
}

#[tokio::test]
async fn test_authorization_runs_before_validation() {
    let app = TestApp::new();
    let token = app.token_for("user@example.com", Role::User);

    let (status, _) = app
        .send(Method::POST, "/api/v1/products", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_token_passes_admin_route() {
    let app = TestApp::new();
    let token = app.token_for("admin@example.com", Role::Admin);

    let (status, json) = app
        .send(Method::POST, "/api/v1/products", Some(&token), Some(valid_product()))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["name"], "Desk lamp");
    assert_eq!(json["data"]["userId"], 1);
    assert_envelope(status, &json);
}

#[tokio::test]
async fn test_admin_token_on_user_route_is_403() {
    use gatekeep::api::{ApiError, Gate, RouteRequirement};
    use gatekeep::schema::catalog;

    let app = TestApp::new();
    let token = app.token_for("admin@example.com", Role::Admin);

    let gate = Gate::new(app.state.jwt.clone(), Arc::new(catalog::registry().unwrap()));
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(header::AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());

    let err = gate.admit(&headers, &RouteRequirement::role(Role::User)).unwrap_err();
    assert_eq!(err, ApiError::Forbidden);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_invalid_product_reports_each_violation() {
    let app = TestApp::new();
    let token = app.token_for("admin@example.com", Role::Admin);

    let (status, json) = app
        .send(
            Method::POST,
            "/api/v1/products",
            Some(&token),
            Some(json!({"name": "ab", "price": -5, "category": 3})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(status, &json);

    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["field"], "name");
    assert_eq!(errors[1]["field"], "price");
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = TestApp::new();
    let token = app.token_for("admin@example.com", Role::Admin);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/products")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_beyond_i64_is_400() {
    let app = TestApp::new();
    let token = app.token_for("admin@example.com", Role::Admin);

    for body in [
        r#"{"name": "Desk lamp", "price": 25.5, "category": 18446744073709551615}"#,
        r#"{"name": "Desk lamp", "price": 25.5, "category": 1e20}"#,
    ] {
        let (status, json) = app.send_raw(Method::POST, "/api/v1/products", Some(&token), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_envelope(status, &json);
        let errors = json["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["field"], "category");
    }

    let (_, json) = app.send(Method::GET, "/api/v1/products", None, None).await;
    assert_eq!(json["meta"]["total"], 0);
}

#[tokio::test]
async fn test_oversized_body_is_413_envelope() {
    let app = TestApp::new();
    let token = app.token_for("admin@example.com", Role::Admin);
    let body = vec![b' '; 2 * 1024 * 1024];

    let (status, json) = app.send_raw(Method::POST, "/api/v1/products", Some(&token), body.clone()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_envelope(status, &json);
    assert_eq!(json["message"], "Request body too large");

    let (status, _) = app.send_raw(Method::POST, "/api/v1/products", None, body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_numeric_id_is_400() {
    let app = TestApp::new();
    let (status, json) = app.send(Method::GET, "/api/v1/products/abc", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"][0]["message"], "ID must be a valid number");
}

// =============================================================================
// Not found and listing
// =============================================================================

#[tokio::test]
async fn test_delete_missing_product_is_404() {
    let app = TestApp::new();
    let token = app.token_for("admin@example.com", Role::Admin);

    let (status, json) = app.send(Method::DELETE, "/api/v1/products/999", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Product with ID 999 not found");
    assert_envelope(status, &json);
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = TestApp::new();
    let (status, json) = app.send(Method::GET, "/api/v1/nowhere", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope(status, &json);
}

#[tokio::test]
async fn test_unsupported_method_is_405_envelope() {
    let app = TestApp::new();

    for (method, uri) in [
        (Method::PATCH, "/api/v1/products"),
        (Method::POST, "/api/v1/products/1"),
        (Method::GET, "/api/v1/login"),
    ] {
        let (status, json) = app.send(method, uri, None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
        assert_envelope(status, &json);
        assert_eq!(json["message"], "Method not allowed");
    }
}

#[tokio::test]
async fn test_list_is_paginated() {
    let app = TestApp::new();
    let owner = app.seed_user("admin@example.com", Role::Admin);
    app.seed_products(owner, 10);

    let (status, json) = app
        .send(Method::GET, "/api/v1/products?limit=5&sortBy=price&sortOrder=asc", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_envelope(status, &json);
    assert_eq!(json["meta"]["total"], 10);
    assert_eq!(json["meta"]["limit"], 5);
    assert_eq!(json["meta"]["totalPage"], 2);

    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 5);
    assert_eq!(data[0]["price"], 10.0);
    assert!(data[0].get("userId").is_none());
}

#[tokio::test]
async fn test_list_rejects_bad_page() {
    let app = TestApp::new();
    let (status, json) = app.send(Method::GET, "/api/v1/products?page=0", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"][0]["message"], "The field page must be a positive integer.");
}

#[tokio::test]
async fn test_empty_list_has_zero_pages() {
    let app = TestApp::new();
    let (status, json) = app.send(Method::GET, "/api/v1/products", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["meta"]["total"], 0);
    assert_eq!(json["meta"]["totalPage"], 0);
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn test_create_for_deleted_owner_is_domain_error() {
    let app = TestApp::new();
    let token = app.state.jwt.issue(42, Role::Admin).unwrap();

    let (status, json) = app
        .send(Method::POST, "/api/v1/products", Some(&token), Some(valid_product()))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "User not found. Invalid userId.");
    assert!(json.get("errors").is_none());
}

#[tokio::test]
async fn test_health_is_open() {
    let app = TestApp::new();
    let (status, json) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}
