use axum::{
    extract::State,
    Extension,
};
use serde_json::Value;

use super::utils::{concrete_type, ensure_readable, find_instance, resolve_entity};
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, UrlPath};
use crate::session::Session;

/// GET /entities/:entity/:id - Get a single instance by id
pub async fn get(
    State(state): State<AppState>,
    UrlPath((entity, id)): UrlPath<(String, String)>,
    session: Option<Extension<Session>>,
) -> ApiResult<Value> {
    let entity_type = resolve_entity(&state, &entity)?;

    let instance = find_instance(&state, entity_type, &id)
        .await?
        .ok_or(ApiError::ObjectNotFound)?;
    ensure_readable(session.as_deref(), &instance)?;

    let concrete = concrete_type(&state, &instance)?;
    Ok(ApiResponse::success(instance.to_document(concrete)))
}
