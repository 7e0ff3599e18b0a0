use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::instance::STORAGE_ID_FIELD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$ne")] Ne,
    #[serde(rename = "$gt")] Gt,
    #[serde(rename = "$gte")] Gte,
    #[serde(rename = "$lt")] Lt,
    #[serde(rename = "$lte")] Lte,

    #[serde(rename = "$in")] In,
    #[serde(rename = "$nin")] NIn,

    #[serde(rename = "$exists")] Exists,

    #[serde(rename = "$and")] And,
    #[serde(rename = "$or")] Or,
    #[serde(rename = "$nor")] NOr,
}

impl FilterOp {
    pub fn from_key(key: &str) -> Option<Self> {
        serde_json::from_value(Value::String(key.to_string())).ok()
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, FilterOp::And | FilterOp::Or | FilterOp::NOr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

impl FilterOrderInfo {
    pub fn asc(column: impl Into<String>) -> Self {
        Self { column: column.into(), sort: SortDirection::Asc }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self { column: column.into(), sort: SortDirection::Desc }
    }
}

/// A complete storage query: which collection, which documents, in which
/// order, which page, and (optionally) who must be able to read them.
#[derive(Debug, Clone)]
pub struct FilterData {
    pub collection: String,
    pub where_clause: Value,
    pub order: Vec<FilterOrderInfo>,
    pub limit: Option<usize>,
    pub offset: usize,
    /// Only documents this user may read are returned; applied before paging
    pub readable_by: Option<String>,
}

impl FilterData {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            where_clause: Value::Object(Map::new()),
            order: vec![FilterOrderInfo::asc(STORAGE_ID_FIELD)],
            limit: None,
            offset: 0,
            readable_by: None,
        }
    }
}
