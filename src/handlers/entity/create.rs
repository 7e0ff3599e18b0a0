use axum::extract::State;
use serde_json::Value;

use super::utils::{resolve_and_validate, resolve_entity, secure_user};
use crate::app::AppState;
use crate::entity::Instance;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, UrlPath};

/// POST /entities/:entity - Create an instance
pub async fn create(
    State(state): State<AppState>,
    UrlPath(entity): UrlPath<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    let entity_type = resolve_entity(&state, &entity)?;

    let mut instance = Instance::from_body(entity_type, &body)?;
    resolve_and_validate(entity_type, &mut instance)?;

    if state.registry.is_user(&entity_type.name) {
        secure_user(&state, &mut instance, true).await?;
    }

    state.store.insert(&instance).await?;
    tracing::info!("Created {} {}", instance.entity, instance.id);

    Ok(ApiResponse::created(instance.to_document(entity_type)))
}
