use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::ApiError;

/// Optional header identifying a logged-in user
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Attach the caller's `Session` to the request extensions when a session
/// token is sent. Requests without the header proceed anonymously; an unknown
/// or unreadable token is rejected.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(header) = request.headers().get(SESSION_TOKEN_HEADER) else {
        return Ok(next.run(request).await);
    };

    let token = header
        .to_str()
        .map_err(|_| ApiError::InvalidSessionToken)?
        .to_string();

    let session = match state.sessions.get(&token).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            tracing::warn!("Unknown session token presented");
            return Err(ApiError::InvalidSessionToken);
        }
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            return Err(ApiError::InvalidSessionToken);
        }
    };

    tracing::debug!("Request on behalf of user {}", session.user_id);
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
