// Axum API server module
//
// Tutorial REST API: items (CRUD + search), users, and a few informational
// endpoints. Collection routes answer with and without a trailing slash.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use moka::future::Cache;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::error::StoreError;
use crate::layout::Subfolder;
use crate::models::{Item, SearchFilters, User};
use crate::store::{Store, StoreResult, ITEM_NOT_FOUND};

pub const WELCOME_MESSAGE: &str = "Welcome to the Generative AI Workspace API!";

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    /// Single-item lookups; entries are invalidated on update/delete
    pub item_cache: Cache<i64, Item>,
    /// Item writes hold this exclusively until their cache entry is gone;
    /// cache fills hold it shared, so a fill never lands after an invalidation.
    item_writes: Arc<RwLock<()>>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        tracing::info!("Opening DuckDB store...");
        let store = Store::open(&config.database_path)?;

        if config.seed_data {
            store.seed_defaults()?;
        }

        tracing::info!("Initializing Moka cache...");
        let item_cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            store: Arc::new(store),
            item_cache,
            item_writes: Arc::new(RwLock::new(())),
        })
    }

    /// Run a store call on the blocking thread pool.
    async fn with_store<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(&*store))
            .await
            .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
            .map_err(AppError::from)
    }

    /// Write to one item and drop its cache entry.
    ///
    /// Runs as its own task so that a dropped request cannot leave the row
    /// written but the cache entry still in place.
    async fn write_item<T, F>(&self, id: i64, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
    {
        let state = self.clone();
        tokio::spawn(async move {
            let _guard = state.item_writes.write().await;
            let result = state.with_store(f).await;
            if result.is_ok() {
                state.item_cache.invalidate(&id).await;
            }
            result
        })
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/health", get(health_check))
        .route("/layout", get(workspace_layout))
        .route("/async-example", get(async_example))
        .route("/async-example/", get(async_example))

        // Items
        .route("/items", get(list_items).post(create_item))
        .route("/items/", get(list_items).post(create_item))
        .route("/items/:id", get(read_item).put(update_item).delete(delete_item))
        .route("/items/:id/status", get(read_item_status))
        .route("/search", get(search_items))
        .route("/search/", get(search_items))

        // Users
        .route("/users", get(list_users).post(create_user))
        .route("/users/", get(list_users).post(create_user))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn read_root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": WELCOME_MESSAGE }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn workspace_layout() -> impl IntoResponse {
    let folders: Vec<serde_json::Value> = Subfolder::ALL
        .iter()
        .map(|f| {
            serde_json::json!({
                "name": format!("{}/", f.dir_name()),
                "content": f.intended_content(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": folders.len(),
        "folders": folders,
    }))
}

async fn async_example() -> impl IntoResponse {
    tokio::task::yield_now().await;
    Json(serde_json::json!({ "message": "This is an async response" }))
}

async fn list_items(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let items = state.with_store(|s| s.list_items()).await?;
    Ok(Json(serde_json::json!({
        "count": items.len(),
        "items": items,
    })))
}

#[derive(Debug, serde::Deserialize)]
struct ItemQuery {
    q: Option<String>,
}

async fn read_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ItemQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = state.item_writes.read().await;

    let item = match state.item_cache.get(&id).await {
        Some(cached) => {
            tracing::debug!("Cache hit for item {}", id);
            cached
        }
        None => {
            let item = state
                .with_store(move |s| s.get_item(id))
                .await?
                .ok_or_else(|| AppError::NotFound(ITEM_NOT_FOUND.to_string()))?;
            state.item_cache.insert(id, item.clone()).await;
            item
        }
    };

    Ok(Json(serde_json::json!({
        "item": item,
        "q": params.q,
    })))
}

async fn create_item(
    State(state): State<AppState>,
    Json(item): Json<Item>,
) -> Result<Json<serde_json::Value>, AppError> {
    let created = state.with_store(move |s| s.create_item(&item)).await?;
    Ok(Json(serde_json::json!({
        "item": created,
        "message": "Item created successfully",
    })))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(item): Json<Item>,
) -> Result<Json<serde_json::Value>, AppError> {
    let updated = state.write_item(id, move |s| s.update_item(id, &item)).await?;
    Ok(Json(serde_json::json!({
        "item_id": id,
        "item": updated,
        "message": "Item updated",
    })))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.write_item(id, move |s| s.delete_item(id)).await?;
    Ok(Json(serde_json::json!({
        "message": format!("Item {} deleted", id),
    })))
}

async fn read_item_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.with_store(move |s| s.item_exists(id)).await? {
        return Err(AppError::NotFound(ITEM_NOT_FOUND.to_string()));
    }
    Ok(Json(serde_json::json!({
        "item_id": id,
        "status": "found",
    })))
}

async fn search_items(
    State(state): State<AppState>,
    Query(filters): Query<SearchFilters>,
) -> Result<Json<serde_json::Value>, AppError> {
    let start = std::time::Instant::now();
    let query = filters.clone();
    let items = state.with_store(move |s| s.search_items(&query)).await?;
    tracing::debug!("Search {:?} returned {} items in {:?}", filters, items.len(), start.elapsed());

    Ok(Json(serde_json::json!({
        "count": items.len(),
        "filters": filters,
        "items": items,
    })))
}

async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<serde_json::Value>, AppError> {
    let created = state.with_store(move |s| s.create_user(&user)).await?;
    Ok(Json(serde_json::json!({
        "user": created,
        "message": "User created",
    })))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let users = state.with_store(|s| s.list_users()).await?;
    Ok(Json(serde_json::json!({
        "count": users.len(),
        "users": users,
    })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Conflict(msg) => AppError::BadRequest(msg),
            other => {
                tracing::error!("Store failure: {}", other);
                AppError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
