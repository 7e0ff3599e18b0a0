use serde_json::Value;

use crate::app::AppState;
use crate::auth;
use crate::entity::{EntityType, Instance, PASSWORD_ATTRIBUTE};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::permission;
use crate::session::Session;

/// Look up a registered entity type by its URL name.
pub fn resolve_entity<'a>(state: &'a AppState, name: &str) -> Result<&'a EntityType, ApiError> {
    state.registry.get(name).ok_or_else(|| {
        tracing::debug!("Request for unregistered entity '{}'", name);
        ApiError::EntityNotFound
    })
}

/// The concrete type of a stored instance, which may be a specialization of
/// the type it was fetched through.
pub fn concrete_type<'a>(state: &'a AppState, instance: &Instance) -> Result<&'a EntityType, ApiError> {
    state.registry.get(&instance.entity).ok_or_else(|| {
        tracing::error!("Stored instance {} has unregistered entity '{}'", instance.id, instance.entity);
        ApiError::InternalServerError
    })
}

/// Fetch an instance of `entity_type` (or any specialization) by id.
pub async fn find_instance(
    state: &AppState,
    entity_type: &EntityType,
    id: &str,
) -> Result<Option<Instance>, ApiError> {
    let filter = Filter::new(entity_type).id(id).build();
    Ok(state.store.find_one(&filter).await?)
}

/// Read check, applied only to requests made on behalf of a logged-in user.
pub fn ensure_readable(session: Option<&Session>, instance: &Instance) -> Result<(), ApiError> {
    match session {
        Some(session) if !permission::has_read_permission(instance, &session.user_id) => {
            tracing::warn!("User {} denied read on {} {}", session.user_id, instance.entity, instance.id);
            Err(ApiError::OperationForbidden)
        }
        _ => Ok(()),
    }
}

pub fn ensure_writable(session: Option<&Session>, instance: &Instance) -> Result<(), ApiError> {
    match session {
        Some(session) if !permission::has_write_permission(instance, &session.user_id) => {
            tracing::warn!("User {} denied write on {} {}", session.user_id, instance.entity, instance.id);
            Err(ApiError::OperationForbidden)
        }
        _ => Ok(()),
    }
}

/// Normalize associations, then check the instance against its type.
pub fn resolve_and_validate(entity_type: &EntityType, instance: &mut Instance) -> Result<(), ApiError> {
    instance.resolve_associations(entity_type);
    entity_type.validate(instance)?;
    Ok(())
}

/// User-specific preparation before a write: hash the password when it was
/// set or changed, and make the user the sole owner of the record.
pub async fn secure_user(state: &AppState, instance: &mut Instance, password_changed: bool) -> Result<(), ApiError> {
    if password_changed {
        if let Some(Value::String(plain)) = instance.attributes.get(PASSWORD_ATTRIBUTE) {
            let hash = auth::hash_password(plain.clone(), state.config.security.bcrypt_cost).await?;
            instance.attributes.insert(PASSWORD_ATTRIBUTE.to_string(), Value::String(hash));
        }
    }
    instance.permissions = Some(permission::owner_only(&instance.id));
    Ok(())
}
