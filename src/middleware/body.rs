use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Request body as loose JSON.
///
/// Only bodies declared as JSON are parsed. Anything else, including an empty
/// body, reads as `{}`; a JSON body that fails to parse is `InvalidJson`.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(&req) {
            return Ok(Self::empty());
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::warn!("Failed to read request body: {}", e);
            ApiError::InvalidJson
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!("Malformed JSON body: {}", e);
            ApiError::InvalidJson
        })
    }
}

impl JsonBody {
    fn empty() -> Self {
        JsonBody(Value::Object(Map::new()))
    }
}

fn is_json(req: &Request) -> bool {
    let Some(content_type) = req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<Value, ApiError> {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let req = builder.body(Body::from(body)).unwrap();
        JsonBody::from_request(req, &()).await.map(|JsonBody(value)| value)
    }

    #[tokio::test]
    async fn parses_json_bodies() {
        let value = extract(Some("application/json; charset=utf-8"), r#"{"a": 1}"#).await.unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[tokio::test]
    async fn empty_or_foreign_bodies_read_as_empty_object() {
        assert_eq!(extract(Some("application/json"), "  ").await.unwrap(), json!({}));
        assert_eq!(extract(Some("text/plain"), r#"{"a": 1}"#).await.unwrap(), json!({}));
        assert_eq!(extract(None, r#"{"a": 1}"#).await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        assert_eq!(extract(Some("application/json"), "{\"a\":").await.unwrap_err(), ApiError::InvalidJson);
    }
}
