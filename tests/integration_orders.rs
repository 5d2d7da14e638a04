mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    create_test_exchange_rate, create_test_order, create_test_user, generate_unique_email,
};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use stockbay::config::cors::CorsConfig;
use stockbay::config::jwt::JwtConfig;
use stockbay::config::runtime::RuntimeMode;
use stockbay::router::init_router;
use stockbay::state::AppState;
use stockbay_cache::{CacheConfig, MemoryCache};
use tower::ServiceExt;
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes";

async fn setup_test_app(pool: PgPool) -> axum::Router {
    let cache_config = CacheConfig::default();
    let state = AppState {
        db: pool,
        jwt_config: JwtConfig::with_secret(TEST_JWT_SECRET),
        cors_config: CorsConfig::from_env(),
        runtime: RuntimeMode::Development,
        cache: MemoryCache::new(Duration::from_secs(cache_config.default_ttl_seconds)),
        cache_config,
    };
    init_router(state)
}

async fn get_auth_token(app: axum::Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn seed_user_and_token(pool: &PgPool) -> String {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &email, password, "user").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    get_auth_token(app, &email, password).await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_order(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "productName": "MacBook Air M2",
                "quantity": 2,
                "priceRMB": 7000.0,
                "exchangeRate": 650.0
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["productName"], "MacBook Air M2");
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["priceRMB"], 7000.0);
    assert_eq!(body["totalCostMGA"], 9_100_000.0);
    assert_eq!(body["status"], "pending");
    assert!(body["orderDate"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_order_falls_back_to_active_rate(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    create_test_exchange_rate(&mut tx, 650.0, true).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "productName": "MacBook Air M2",
                "quantity": 1,
                "priceRMB": 7000.0
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["exchangeRate"], 650.0);
    assert_eq!(body["totalCostMGA"], 4_550_000.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_order_without_any_rate(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "productName": "MacBook Air M2",
                "quantity": 1,
                "priceRMB": 7000.0
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "No active exchange rate is set");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_order_with_explicit_status(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "productName": "MacBook Air M2",
                "quantity": 1,
                "priceRMB": 7000.0,
                "exchangeRate": 650.0,
                "status": "processing"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "processing");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_orders_filter_by_status(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    create_test_order(&mut tx, "Order A", 1, 100.0, 650.0, "pending").await;
    create_test_order(&mut tx, "Order B", 1, 100.0, 650.0, "completed").await;
    create_test_order(&mut tx, "Order C", 1, 100.0, 650.0, "completed").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/orders?status=completed")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let data = body["data"].as_array().unwrap();

    assert_eq!(data.len(), 2);
    assert!(data.iter().all(|o| o["status"] == "completed"));
    assert_eq!(body["pagination"]["total"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_orders_unknown_status_ignored(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    create_test_order(&mut tx, "Order A", 1, 100.0, 650.0, "pending").await;
    create_test_order(&mut tx, "Order B", 1, 100.0, 650.0, "completed").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    // An unrecognized status drops the filter instead of failing the request.
    let request = Request::builder()
        .method("GET")
        .uri("/api/orders?status=shipped")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["pagination"]["total"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_orders_pagination(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    for i in 0..25 {
        create_test_order(&mut tx, &format!("Order {}", i), 1, 100.0, 650.0, "pending").await;
    }
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/orders?page=2&limit=10")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["total"], 25);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["hasNext"], true);
    assert_eq!(body["pagination"]["hasPrev"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_order(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let order_id = create_test_order(&mut tx, "MacBook Air M2", 2, 7000.0, 650.0, "pending").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/orders/{}", order_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["id"], order_id.to_string());
    assert_eq!(body["productName"], "MacBook Air M2");
    assert_eq!(body["totalCostMGA"], 9_100_000.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_order_not_found(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;
    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/orders/{}", Uuid::new_v4()))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["error"]["message"], "Order not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_order_recomputes_total(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let order_id = create_test_order(&mut tx, "MacBook Air M2", 2, 7000.0, 650.0, "pending").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/orders/{}", order_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({ "quantity": 5 })).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["quantity"], 5);
    // 7000 RMB * 650 * 5.
    assert_eq!(body["totalCostMGA"], 22_750_000.0);
    assert_eq!(body["productName"], "MacBook Air M2");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_order_status(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let order_id = create_test_order(&mut tx, "MacBook Air M2", 2, 7000.0, 650.0, "pending").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/orders/{}", order_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({ "status": "completed" })).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["status"], "completed");
    // The numeric fields did not change.
    assert_eq!(body["totalCostMGA"], 9_100_000.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_order_rejects_unknown_status(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let order_id = create_test_order(&mut tx, "MacBook Air M2", 2, 7000.0, 650.0, "pending").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    // Unlike the lenient list filter, a bad status in an update body is an
    // error: silently keeping the old value would hide a failed transition.
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/orders/{}", order_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({ "status": "shipped" })).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_order(pool: PgPool) {
    let token = seed_user_and_token(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let order_id = create_test_order(&mut tx, "MacBook Air M2", 2, 7000.0, 650.0, "pending").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/orders/{}", order_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = setup_test_app(pool.clone()).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/orders/{}", order_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
