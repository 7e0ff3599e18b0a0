use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension,
};
use serde_json::{json, Value};

use super::utils::{concrete_type, resolve_entity};
use crate::app::AppState;
use crate::error::ApiError;
use crate::filter::{Filter, FilterPage};
use crate::middleware::{ApiResponse, ApiResult, UrlPath};
use crate::session::Session;

/// GET /entities/:entity?query=&limit=&skip=&page=&sort= - List instances
///
/// Parameters are taken as raw strings so that malformed values fall back to
/// their defaults instead of rejecting the request.
pub async fn find(
    State(state): State<AppState>,
    UrlPath(entity): UrlPath<String>,
    Query(params): Query<HashMap<String, String>>,
    session: Option<Extension<Session>>,
) -> ApiResult<Value> {
    let entity_type = resolve_entity(&state, &entity)?;
    let param = |name: &str| params.get(name).map(String::as_str);

    let page = FilterPage::from_params(
        param("limit"),
        param("skip"),
        param("page"),
        &state.config.pagination,
    );

    let filter = Filter::new(entity_type)
        .where_param(param("query"))
        .map_err(|e| {
            tracing::debug!("Rejected query parameter: {}", e);
            ApiError::InvalidQuery
        })?
        .order_param(param("sort"))
        .page(page)
        .readable_by(session.as_deref().map(|s| s.user_id.as_str()))
        .build();

    let instances = state.store.find(&filter).await?;

    let results = instances
        .iter()
        .map(|instance| Ok(instance.to_document(concrete_type(&state, instance)?)))
        .collect::<Result<Vec<Value>, ApiError>>()?;

    Ok(ApiResponse::success(json!({ "results": results })))
}
