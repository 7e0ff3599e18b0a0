use std::cmp::Ordering;

use serde_json::{json, Map, Value};

use super::error::FilterError;
use super::filter_order::{compare_values, type_rank};
use super::types::FilterOp;
use crate::entity::instance::STORAGE_ID_FIELD;

pub struct FilterWhere;

impl FilterWhere {
    /// Decode the `query` URL parameter into a where clause. The value is
    /// percent-decoded once more after the framework's own decoding, must be a
    /// JSON object, and has a top-level `id` key renamed to `_id`.
    pub fn parse_param(raw: &str) -> Result<Value, FilterError> {
        let decoded = urlencoding::decode(raw).map_err(|e| FilterError::InvalidEncoding(e.to_string()))?;
        let parsed: Value = serde_json::from_str(&decoded)?;

        let Value::Object(mut conditions) = parsed else {
            return Err(FilterError::InvalidWhereClause("query must be a JSON object".to_string()));
        };
        if let Some(id) = conditions.remove("id") {
            conditions.insert(STORAGE_ID_FIELD.to_string(), id);
        }

        let conditions = Value::Object(conditions);
        Self::validate(&conditions)?;
        Ok(conditions)
    }

    /// Restrict `conditions` to documents whose `Entity` is one of `entities`.
    pub fn scoped(entities: &[String], conditions: Value) -> Value {
        let scope = json!({ "Entity": { "$in": entities } });
        match conditions {
            Value::Object(ref map) if map.is_empty() => scope,
            other => json!({ "$and": [scope, other] }),
        }
    }

    /// Check every operator in the clause is known and well formed.
    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        // Evaluating against an empty document walks every operator.
        Self::matches(where_data, &Value::Object(Map::new())).map(|_| ())
    }

    pub fn matches(where_data: &Value, document: &Value) -> Result<bool, FilterError> {
        let Value::Object(conditions) = where_data else {
            return Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string()));
        };

        let mut result = true;
        for (key, value) in conditions {
            let matched = if key.starts_with('$') {
                Self::match_logical(key, value, document)?
            } else {
                Self::match_field(lookup(document, key), value)?
            };
            result &= matched;
        }
        Ok(result)
    }

    fn match_logical(key: &str, value: &Value, document: &Value) -> Result<bool, FilterError> {
        let op = FilterOp::from_key(key)
            .filter(FilterOp::is_logical)
            .ok_or_else(|| FilterError::UnsupportedOperator(key.to_string()))?;

        let clauses = value
            .as_array()
            .filter(|clauses| !clauses.is_empty())
            .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} expects a non-empty array", key)))?;

        let results = clauses
            .iter()
            .map(|clause| Self::matches(clause, document))
            .collect::<Result<Vec<bool>, _>>()?;

        Ok(match op {
            FilterOp::And => results.iter().all(|r| *r),
            FilterOp::Or => results.iter().any(|r| *r),
            _ => !results.iter().any(|r| *r),
        })
    }

    fn match_field(field: Option<&Value>, condition: &Value) -> Result<bool, FilterError> {
        let operators = match condition {
            Value::Object(map) if !map.is_empty() && map.keys().all(|k| k.starts_with('$')) => map,
            _ => return Ok(equals(field, condition)),
        };

        let mut result = true;
        for (key, data) in operators {
            let op = FilterOp::from_key(key)
                .filter(|op| !op.is_logical())
                .ok_or_else(|| FilterError::UnsupportedOperator(key.to_string()))?;

            let matched = match op {
                FilterOp::Eq => equals(field, data),
                FilterOp::Ne => !equals(field, data),
                FilterOp::Gt => ordered(field, data, |o| o == Ordering::Greater),
                FilterOp::Gte => ordered(field, data, |o| o != Ordering::Less),
                FilterOp::Lt => ordered(field, data, |o| o == Ordering::Less),
                FilterOp::Lte => ordered(field, data, |o| o != Ordering::Greater),
                FilterOp::In => in_list(key, field, data)?,
                FilterOp::NIn => !in_list(key, field, data)?,
                FilterOp::Exists => {
                    let wanted = data
                        .as_bool()
                        .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} expects a boolean", key)))?;
                    field.is_some() == wanted
                }
                FilterOp::And | FilterOp::Or | FilterOp::NOr => unreachable!("filtered above"),
            };
            result &= matched;
        }
        Ok(result)
    }
}

/// Resolve a dotted path (`permissions.u1.read`) inside a document.
pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, segment| current.as_object()?.get(segment))
}

fn scalar_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Equality with Mongo conventions: null matches a missing field, and a scalar
/// matches an array that contains it.
fn equals(field: Option<&Value>, expected: &Value) -> bool {
    match (field, expected) {
        (None, Value::Null) => true,
        (None, _) => false,
        (Some(Value::Array(items)), expected) if !expected.is_array() => {
            items.iter().any(|item| scalar_equals(item, expected))
        }
        (Some(actual), expected) => scalar_equals(actual, expected),
    }
}

/// Range comparison; only values of the same type bracket compare.
fn ordered(field: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    match field {
        Some(actual) if type_rank(actual) == type_rank(bound) && !actual.is_null() => {
            accept(compare_values(actual, bound))
        }
        _ => false,
    }
}

fn in_list(key: &str, field: Option<&Value>, data: &Value) -> Result<bool, FilterError> {
    let candidates = data
        .as_array()
        .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} expects an array", key)))?;
    Ok(candidates.iter().any(|candidate| equals(field, candidate)))
}
