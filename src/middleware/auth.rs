use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::ApiError;

/// Header carrying the application's shared access token
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Access-token guard in front of every entity and security route.
/// Stateless: the request either proceeds untouched or is rejected.
pub async fn access_token_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(ACCESS_TOKEN_HEADER)
        .ok_or_else(|| {
            tracing::warn!("Rejected {} {}: access token missing", request.method(), request.uri().path());
            ApiError::AccessTokenMissing
        })?;

    let expected = &state.config.security.access_token;
    if expected.is_empty() || provided.as_bytes() != expected.as_bytes() {
        tracing::warn!("Rejected {} {}: invalid access token", request.method(), request.uri().path());
        return Err(ApiError::InvalidApiCredentials);
    }

    Ok(next.run(request).await)
}
