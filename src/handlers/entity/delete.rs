use axum::{
    extract::State,
    Extension,
};

use super::utils::{ensure_writable, find_instance, resolve_entity};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, UrlPath};
use crate::session::Session;

/// DELETE /entities/:entity/:id - Delete an instance
///
/// An id with no stored instance is still a success.
pub async fn delete(
    State(state): State<AppState>,
    UrlPath((entity, id)): UrlPath<(String, String)>,
    session: Option<Extension<Session>>,
) -> ApiResult<()> {
    let entity_type = resolve_entity(&state, &entity)?;

    let Some(instance) = find_instance(&state, entity_type, &id).await? else {
        tracing::debug!("Delete of absent {} {} treated as done", entity, id);
        return Ok(ApiResponse::no_content());
    };
    ensure_writable(session.as_deref(), &instance)?;

    if state.store.delete(&instance).await? {
        tracing::info!("Deleted {} {}", instance.entity, instance.id);
    }
    Ok(ApiResponse::no_content())
}
