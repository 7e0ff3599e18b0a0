use axum::extract::State;
use serde_json::{json, Map, Value};

use crate::app::AppState;
use crate::auth::verify_password;
use crate::entity::{PASSWORD_ATTRIBUTE, USERNAME_ATTRIBUTE, USER_ENTITY};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};

/// POST /login - Exchange username and password for a session token
///
/// An unknown username and a wrong password are indistinguishable to the caller.
pub async fn login(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<Value> {
    let username = body.get(USERNAME_ATTRIBUTE).ok_or(ApiError::UsernameMissing)?;
    let password = body.get(PASSWORD_ATTRIBUTE).ok_or(ApiError::PasswordMissing)?;

    let (Some(username), Some(password)) = (username.as_str(), password.as_str()) else {
        tracing::warn!("Login rejected: credentials are not strings");
        return Err(ApiError::InvalidUserCredentials);
    };

    let user_type = state.registry.get(USER_ENTITY).ok_or_else(|| {
        tracing::error!("Entity registry has no {} type", USER_ENTITY);
        ApiError::InternalServerError
    })?;

    let mut conditions = Map::new();
    conditions.insert(USERNAME_ATTRIBUTE.to_string(), Value::String(username.to_string()));
    let filter = Filter::new(user_type).conditions(Value::Object(conditions)).build();

    let Some(user) = state.store.find_one(&filter).await? else {
        tracing::warn!("Login rejected: unknown username '{}'", username);
        return Err(ApiError::InvalidUserCredentials);
    };

    let stored = user.attribute_str(PASSWORD_ATTRIBUTE).unwrap_or_default().to_string();
    if !verify_password(password.to_string(), stored).await {
        tracing::warn!("Login rejected: wrong password for '{}'", username);
        return Err(ApiError::InvalidUserCredentials);
    }

    let session = state.sessions.create(&user.id).await?;
    tracing::info!("User {} logged in", user.id);

    Ok(ApiResponse::success(json!({ "sessionToken": session.token })))
}
