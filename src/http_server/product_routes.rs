//! Product HTTP Routes
//!
//! Public reads, admin-only writes. Every handler goes through the gate
//! before touching the repository.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, Query, State},
    http::HeaderMap,
    routing::get,
    Router,
};
use serde_json::{Map, Value};

use crate::api::{method_not_allowed, ApiError, ApiResult, ResponseEnvelope, RouteRequirement};
use crate::auth::Role;
use crate::schema::catalog;
use crate::storage::{
    NewProduct, Pagination, PaginationMeta, Product, ProductFilter, ProductListing, ProductPatch,
    SortField, SortOrder, StorageError,
};
use crate::storage::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE};

use super::state::AppState;

pub const LIST: RouteRequirement = RouteRequirement::public();
pub const GET: RouteRequirement = RouteRequirement::public();
pub const CREATE: RouteRequirement = RouteRequirement::role(Role::Admin).with_body(catalog::PRODUCT_CREATE);
pub const UPDATE: RouteRequirement = RouteRequirement::role(Role::Admin).with_body(catalog::PRODUCT_UPDATE);
pub const DELETE: RouteRequirement = RouteRequirement::role(Role::Admin);

pub const REQUIREMENTS: &[RouteRequirement] = &[LIST, GET, CREATE, UPDATE, DELETE];

/// Product routes with shared state
pub fn product_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/products",
            get(list_handler).post(create_handler).fallback(method_not_allowed),
        )
        .route(
            "/products/:id",
            get(get_handler)
                .put(update_handler)
                .delete(delete_handler)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

// ==================
// Handlers
// ==================

/// List products with filtering, sorting and pagination
async fn list_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<ResponseEnvelope<Vec<ProductListing>>> {
    state.gate.admit(&headers, &LIST)?;

    let raw: Map<String, Value> = params.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
    let validated = state.gate.validate(catalog::PRODUCT_QUERY, &Value::Object(raw))?;
    let query = validated.as_value();

    let text = |key: &str| query.get(key).and_then(Value::as_str);
    let number = |key: &str, default: u64| text(key).and_then(|v| v.parse().ok()).unwrap_or(default);

    let pagination = Pagination::new(number("page", DEFAULT_PAGE), number("limit", DEFAULT_LIMIT)).sorted(
        SortField::parse_or_default(text("sortBy")),
        SortOrder::parse_or_default(text("sortOrder")),
    );
    let filter = ProductFilter {
        category: text("category").map(str::to_string),
        search: text("search").filter(|s| !s.is_empty()).map(str::to_string),
    };

    let page = state.products.find_many(&filter, &pagination)?;
    let meta = PaginationMeta::for_page(&page, &pagination);
    let items = page.items.into_iter().map(ProductListing::from).collect();

    Ok(ResponseEnvelope::paginated(items, meta).with_message("Products retrieved successfully"))
}

/// Fetch one product
async fn get_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<ResponseEnvelope<Product>> {
    state.gate.admit(&headers, &GET)?;
    let id = state.gate.path_id(&id)?;

    let product = state
        .products
        .find_by_id(id)?
        .ok_or_else(|| StorageError::not_found("Product", id))?;

    Ok(ResponseEnvelope::ok(product).with_message("Product retrieved successfully"))
}

/// Create a product owned by the calling admin
async fn create_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ResponseEnvelope<Product>> {
    let ctx = state.gate.admit(&headers, &CREATE)?;
    let payload = state.gate.accept(&CREATE, &body?)?;

    let owner_id = ctx
        .principal()
        .map(|p| p.subject_id)
        .ok_or(ApiError::Forbidden)?;
    if state.users.find_by_id(owner_id)?.is_none() {
        return Err(ApiError::domain("User not found. Invalid userId."));
    }

    let new_product: NewProduct = payload.into_typed().map_err(ApiError::internal)?;
    let product = state.products.create(owner_id, new_product)?;

    tracing::info!(
        request_id = %ctx.request_id,
        product_id = product.id,
        owner = owner_id,
        elapsed_ms = ctx.elapsed_ms(),
        "product created"
    );

    Ok(ResponseEnvelope::created(product).with_message("Product created successfully"))
}

/// Apply a partial update
async fn update_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ResponseEnvelope<Product>> {
    let ctx = state.gate.admit(&headers, &UPDATE)?;
    let id = state.gate.path_id(&id)?;
    let payload = state.gate.accept(&UPDATE, &body?)?;

    let patch: ProductPatch = payload.into_typed().map_err(ApiError::internal)?;
    let product = state.products.update(id, patch)?;
    tracing::info!(
        request_id = %ctx.request_id,
        product_id = id,
        elapsed_ms = ctx.elapsed_ms(),
        "product updated"
    );

    Ok(ResponseEnvelope::ok(product).with_message("Product updated successfully"))
}

/// Remove a product
async fn delete_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<ResponseEnvelope<()>> {
    let ctx = state.gate.admit(&headers, &DELETE)?;
    let id = state.gate.path_id(&id)?;

    state.products.delete(id)?;
    tracing::info!(
        request_id = %ctx.request_id,
        product_id = id,
        elapsed_ms = ctx.elapsed_ms(),
        "product deleted"
    );

    Ok(ResponseEnvelope::acknowledged("Product deleted successfully"))
}
