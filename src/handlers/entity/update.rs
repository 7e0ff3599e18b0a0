use axum::{
    extract::State,
    Extension,
};
use serde_json::Value;

use super::utils::{concrete_type, ensure_writable, find_instance, resolve_and_validate, resolve_entity, secure_user};
use crate::app::AppState;
use crate::entity::PASSWORD_ATTRIBUTE;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, UrlPath};
use crate::session::Session;

/// PUT /entities/:entity/:id - Merge the body into an existing instance
pub async fn update(
    State(state): State<AppState>,
    UrlPath((entity, id)): UrlPath<(String, String)>,
    session: Option<Extension<Session>>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    let entity_type = resolve_entity(&state, &entity)?;

    let mut instance = find_instance(&state, entity_type, &id)
        .await?
        .ok_or(ApiError::ObjectNotFound)?;
    ensure_writable(session.as_deref(), &instance)?;

    let concrete = concrete_type(&state, &instance)?;
    let changed = instance.merge(&body)?;
    resolve_and_validate(concrete, &mut instance)?;

    if state.registry.is_user(&concrete.name) {
        let password_changed = changed.iter().any(|name| name == PASSWORD_ATTRIBUTE);
        secure_user(&state, &mut instance, password_changed).await?;
    }

    state.store.update(&instance).await?;
    tracing::info!("Updated {} {}", instance.entity, instance.id);

    Ok(ApiResponse::success(instance.to_document(concrete)))
}
