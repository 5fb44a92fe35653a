// API Integration Tests
//
// Drives the router in-process against a seeded in-memory database.
// Run with: cargo test --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use genai_workspace::{create_router, AppState, ServerConfig};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    fn create_test_app() -> axum::Router {
        let state = AppState::new(&ServerConfig::in_memory()).expect("in-memory state");
        create_router(state)
    }

    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, json_response(response).await)
    }

    async fn send_json(app: &axum::Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, json_response(response).await)
    }

    async fn delete(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, json_response(response).await)
    }

    async fn status_of(app: &axum::Router, uri: &str) -> StatusCode {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    // =========================================================================
    // Informational endpoints
    // =========================================================================

    #[tokio::test]
    async fn test_root_and_health() {
        let app = create_test_app();

        let (status, body) = get(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome to the Generative AI Workspace API!");

        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_async_example() {
        let app = create_test_app();
        let (status, body) = get(&app, "/async-example/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "This is an async response");
    }

    #[tokio::test]
    async fn test_layout_lists_six_folders() {
        let app = create_test_app();
        let (status, body) = get(&app, "/layout").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 6);
        assert_eq!(body["folders"][0]["name"], "notebooks/");
        assert_eq!(
            body["folders"][3]["content"],
            "data-preparation scripts (no large data committed)"
        );
    }

    // =========================================================================
    // Items
    // =========================================================================

    #[tokio::test]
    async fn test_list_seeded_items() {
        let app = create_test_app();

        for uri in ["/items", "/items/"] {
            let (status, body) = get(&app, uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["count"], 5);
            assert_eq!(body["items"][0]["name"], "Laptop");
            assert_eq!(body["items"][1]["is_offer"], false);
        }
    }

    #[tokio::test]
    async fn test_read_item_with_query() {
        let app = create_test_app();

        let (status, body) = get(&app, "/items/3?q=keys").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item"]["id"], 3);
        assert_eq!(body["item"]["name"], "Keyboard");
        assert_eq!(body["q"], "keys");

        let (_, body) = get(&app, "/items/3").await;
        assert!(body["q"].is_null());
    }

    #[tokio::test]
    async fn test_read_missing_item() {
        let app = create_test_app();
        let (status, body) = get(&app, "/items/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Item not found");
    }

    #[tokio::test]
    async fn test_create_item_assigns_id() {
        let app = create_test_app();

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/items/",
            json!({"name": "apple", "price": 1.5}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Item created successfully");
        assert_eq!(body["item"]["id"], 6);
        assert_eq!(body["item"]["name"], "apple");
        assert!(body["item"]["is_offer"].is_null());

        let (_, body) = get(&app, "/items").await;
        assert_eq!(body["count"], 6);
    }

    #[tokio::test]
    async fn test_create_item_rejects_invalid_body() {
        let app = create_test_app();
        let (status, _) = send_json(&app, Method::POST, "/items", json!({"name": "no price"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_update_is_visible_after_cached_read() {
        let app = create_test_app();

        // Populate the cache
        let (_, before) = get(&app, "/items/1").await;
        assert_eq!(before["item"]["name"], "Laptop");

        let (status, body) = send_json(
            &app,
            Method::PUT,
            "/items/1",
            json!({"name": "Ultrabook", "price": 1299.0, "is_offer": false}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item_id"], 1);
        assert_eq!(body["message"], "Item updated");

        let (_, after) = get(&app, "/items/1").await;
        assert_eq!(after["item"]["name"], "Ultrabook");
        assert_eq!(after["item"]["price"], 1299.0);
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let app = create_test_app();
        let (status, body) = send_json(
            &app,
            Method::PUT,
            "/items/999",
            json!({"name": "Ghost", "price": 1.0}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Item not found");
    }

    #[tokio::test]
    async fn test_delete_item() {
        let app = create_test_app();

        let _ = get(&app, "/items/2").await;
        let (status, body) = delete(&app, "/items/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Item 2 deleted");

        let (status, _) = get(&app, "/items/2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = delete(&app, "/items/2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_item_status() {
        let app = create_test_app();

        let (status, body) = get(&app, "/items/4/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"item_id": 4, "status": "found"}));

        let (status, body) = get(&app, "/items/999/status").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Item not found");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_stale_read_after_concurrent_delete() {
        let app = create_test_app();
        let deleted = Arc::new(AtomicBool::new(false));

        let mut readers = Vec::new();
        for _ in 0..8 {
            let app = app.clone();
            let deleted = deleted.clone();
            readers.push(tokio::spawn(async move {
                let mut stale = 0;
                let mut reads_after_delete = 0;
                while reads_after_delete < 20 {
                    let delete_done = deleted.load(Ordering::SeqCst);
                    let status = status_of(&app, "/items/1").await;
                    if delete_done {
                        reads_after_delete += 1;
                        if status == StatusCode::OK {
                            stale += 1;
                        }
                    }
                }
                stale
            }));
        }

        tokio::task::yield_now().await;
        let (status, _) = delete(&app, "/items/1").await;
        assert_eq!(status, StatusCode::OK);
        deleted.store(true, Ordering::SeqCst);

        let mut stale = 0;
        for reader in readers {
            stale += reader.await.unwrap();
        }
        assert_eq!(stale, 0, "reads served a deleted item after DELETE returned");
        assert_eq!(status_of(&app, "/items/1").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_end_with_fresh_cache() {
        let app = create_test_app();
        let _ = get(&app, "/items/2").await;

        let mut tasks = Vec::new();
        for n in 0..6 {
            let app = app.clone();
            tasks.push(tokio::spawn(async move {
                let _ = get(&app, "/items/2").await;
                send_json(
                    &app,
                    Method::PUT,
                    "/items/2",
                    json!({"name": format!("Mouse v{}", n), "price": n as f64}),
                )
                .await
                .0
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), StatusCode::OK);
        }

        let (_, cached) = get(&app, "/items/2").await;
        let (_, listed) = get(&app, "/items").await;
        let stored = listed["items"]
            .as_array()
            .unwrap()
            .iter()
            .find(|i| i["id"] == 2)
            .cloned()
            .unwrap();
        assert_eq!(cached["item"], stored);
    }

    // =========================================================================
    // Search
    // =========================================================================

    #[tokio::test]
    async fn test_search_by_name_is_case_insensitive() {
        let app = create_test_app();
        let (status, body) = get(&app, "/search/?name=laptop").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["items"][0]["name"], "Laptop");
        assert_eq!(body["filters"]["name"], "laptop");
        assert!(body["filters"]["price_min"].is_null());
    }

    #[tokio::test]
    async fn test_search_price_bounds_inclusive() {
        let app = create_test_app();
        let (_, body) = get(&app, "/search?price_min=25.5&price_max=75").await;
        let names: Vec<&str> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Mouse", "Keyboard"]);
        assert_eq!(body["filters"]["price_min"], 25.5);
        assert_eq!(body["filters"]["price_max"], 75.0);
    }

    #[tokio::test]
    async fn test_search_empty_price_is_no_bound() {
        let app = create_test_app();

        let (status, body) = get(&app, "/search?price_min=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 5);
        assert!(body["filters"]["price_min"].is_null());

        let (status, body) = get(&app, "/search?price_min=&price_max=30").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["items"][0]["name"], "Mouse");
        assert_eq!(body["filters"]["price_max"], 30.0);
    }

    #[tokio::test]
    async fn test_search_rejects_non_numeric_price() {
        let app = create_test_app();
        assert_eq!(status_of(&app, "/search?price_min=abc").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_of(&app, "/search?price_max=cheap").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_without_filters_returns_all() {
        let app = create_test_app();
        let (_, body) = get(&app, "/search").await;
        assert_eq!(body["count"], 5);
    }

    // =========================================================================
    // Users
    // =========================================================================

    #[tokio::test]
    async fn test_create_user() {
        let app = create_test_app();

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/users/",
            json!({"username": "bob", "email": "bob@example.com"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User created");
        assert_eq!(body["user"]["id"], 4);
        assert!(body["user"]["full_name"].is_null());

        let (_, body) = get(&app, "/users").await;
        assert_eq!(body["count"], 4);
    }

    #[tokio::test]
    async fn test_duplicate_user_is_rejected() {
        let app = create_test_app();

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/users",
            json!({"username": "john_doe", "email": "new@example.com", "full_name": "Another John"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username or email already exists");

        let (_, body) = get(&app, "/users").await;
        assert_eq!(body["count"], 3);
    }

    #[tokio::test]
    async fn test_unseeded_database_starts_empty() {
        let config = ServerConfig {
            seed_data: false,
            ..ServerConfig::in_memory()
        };
        let app = create_router(AppState::new(&config).unwrap());

        let (_, body) = get(&app, "/items").await;
        assert_eq!(body["count"], 0);
        let (_, body) = get(&app, "/users").await;
        assert_eq!(body["count"], 0);
    }
}
