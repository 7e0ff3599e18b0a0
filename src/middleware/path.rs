use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Route parameters that reject as `UrlNotFound` when they cannot be decoded.
#[derive(Debug, Clone)]
pub struct UrlPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for UrlPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(UrlPath(value)),
            Err(e) => {
                tracing::debug!("Undecodable path {}: {}", parts.uri.path(), e);
                Err(ApiError::UrlNotFound)
            }
        }
    }
}
