// handlers/mod.rs - HTTP handlers
//
// entity/   → /entities/:entity[/:id] CRUD over registered entity types
// security/ → /login and /logout

pub mod entity;
pub mod security;

use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;

/// Fallback for every unmatched route
pub async fn not_found() -> ApiError {
    ApiError::UrlNotFound
}

/// GET /health - liveness check, outside the access-token guard
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
