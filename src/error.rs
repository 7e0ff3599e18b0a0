// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::PasswordError;
use crate::entity::ValidationError;
use crate::session::SessionError;
use crate::store::StoreError;

/// Every failure the gateway reports to a client.
///
/// The set is closed: each variant maps to one numeric `code`, one message and
/// one HTTP status, rendered as `{"code": .., "error": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    InvalidQuery,
    InvalidJson,
    InvalidEntity,
    DuplicatedEntry,

    // 401 Unauthorized
    AccessTokenMissing,
    InvalidApiCredentials,
    UsernameMissing,
    PasswordMissing,
    InvalidUserCredentials,
    InvalidSessionToken,

    // 403 Forbidden
    OperationForbidden,

    // 404 Not Found
    UrlNotFound,
    EntityNotFound,
    ObjectNotFound,

    // 500 Internal Server Error
    InternalServerError,
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidQuery
            | ApiError::InvalidJson
            | ApiError::InvalidEntity
            | ApiError::DuplicatedEntry => 400,
            ApiError::AccessTokenMissing
            | ApiError::InvalidApiCredentials
            | ApiError::UsernameMissing
            | ApiError::PasswordMissing
            | ApiError::InvalidUserCredentials
            | ApiError::InvalidSessionToken => 401,
            ApiError::OperationForbidden => 403,
            ApiError::UrlNotFound | ApiError::EntityNotFound | ApiError::ObjectNotFound => 404,
            ApiError::InternalServerError => 500,
        }
    }

    /// Numeric error code for client handling
    pub fn code(&self) -> u16 {
        match self {
            ApiError::InvalidQuery => 101,
            ApiError::InvalidJson => 102,
            ApiError::InvalidEntity => 103,
            ApiError::DuplicatedEntry => 104,
            ApiError::AccessTokenMissing => 112,
            ApiError::InvalidApiCredentials => 113,
            ApiError::UsernameMissing => 114,
            ApiError::PasswordMissing => 115,
            ApiError::InvalidUserCredentials => 116,
            ApiError::InvalidSessionToken => 117,
            ApiError::OperationForbidden => 118,
            ApiError::UrlNotFound => 121,
            ApiError::EntityNotFound => 122,
            ApiError::ObjectNotFound => 123,
            ApiError::InternalServerError => 1,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidQuery => "Invalid Query",
            ApiError::InvalidJson => "Invalid JSON",
            ApiError::InvalidEntity => "Invalid Entity",
            ApiError::DuplicatedEntry => "Duplicated Entry",
            ApiError::AccessTokenMissing => "Access Token Missing",
            ApiError::InvalidApiCredentials => "Invalid API Credentials",
            ApiError::UsernameMissing => "Username Missing",
            ApiError::PasswordMissing => "Password Missing",
            ApiError::InvalidUserCredentials => "Invalid User Credentials",
            ApiError::InvalidSessionToken => "Invalid Session Token",
            ApiError::OperationForbidden => "Operation Forbidden",
            ApiError::UrlNotFound => "URL Not Found",
            ApiError::EntityNotFound => "Entity Not Found",
            ApiError::ObjectNotFound => "Object Not Found",
            ApiError::InternalServerError => "Internal Server Error",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "code": self.code(),
            "error": self.message()
        })
    }
}

// Convert lower-layer error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field } => {
                tracing::debug!("Duplicate value rejected on unique field '{}'", field);
                ApiError::DuplicatedEntry
            }
            StoreError::NotFound { id } => {
                tracing::debug!("Instance {} vanished before the write", id);
                ApiError::ObjectNotFound
            }
            StoreError::InvalidQuery(msg) => {
                tracing::debug!("Rejected query: {}", msg);
                ApiError::InvalidQuery
            }
            StoreError::Backend(msg) => {
                // Don't expose storage internals to clients
                tracing::error!("Entity store error: {}", msg);
                ApiError::InternalServerError
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        tracing::debug!("Entity validation failed: {}", err);
        ApiError::InvalidEntity
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        tracing::error!("Session store error: {}", err);
        ApiError::InternalServerError
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::InternalServerError
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {}", err);
        ApiError::InternalServerError
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
