use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::session::Session;

/// POST /logout - End the session named by the session-token header
pub async fn logout(
    State(state): State<AppState>,
    session: Option<Extension<Session>>,
) -> ApiResult<Value> {
    let Some(Extension(session)) = session else {
        tracing::warn!("Logout without a session");
        return Err(ApiError::OperationForbidden);
    };

    match state.sessions.destroy(&session.token).await? {
        Some(ended) => tracing::info!("User {} logged out", ended.user_id),
        // Raced with a concurrent logout of the same token.
        None => return Err(ApiError::InvalidSessionToken),
    }

    Ok(ApiResponse::success(json!({})))
}
