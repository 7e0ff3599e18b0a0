use std::cmp::Ordering;

use serde_json::Value;

use super::filter_where::lookup;
use super::types::{FilterOrderInfo, SortDirection};
use crate::entity::instance::STORAGE_ID_FIELD;

pub struct FilterOrder;

impl FilterOrder {
    /// Parse a `sort` parameter such as `-age,name`. A leading `-` sorts that
    /// field descending; anything else sorts ascending. Falls back to `_id`
    /// ascending when nothing usable is given.
    pub fn parse(raw: Option<&str>) -> Vec<FilterOrderInfo> {
        let mut out = Vec::new();
        for part in raw.unwrap_or_default().split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }

            let info = match trimmed.strip_prefix('-').map(str::trim) {
                Some("") => continue,
                Some(rest) => FilterOrderInfo::desc(Self::storage_column(rest)),
                None => FilterOrderInfo::asc(Self::storage_column(trimmed)),
            };
            out.push(info);
        }

        if out.is_empty() {
            out.push(FilterOrderInfo::asc(STORAGE_ID_FIELD));
        }
        out
    }

    fn storage_column(column: &str) -> String {
        if column == "id" { STORAGE_ID_FIELD.to_string() } else { column.to_string() }
    }

    /// Compare two storage documents key by key.
    pub fn compare(a: &Value, b: &Value, infos: &[FilterOrderInfo]) -> Ordering {
        for info in infos {
            let left = lookup(a, &info.column).unwrap_or(&Value::Null);
            let right = lookup(b, &info.column).unwrap_or(&Value::Null);
            let ordering = match info.sort {
                SortDirection::Asc => compare_values(left, right),
                SortDirection::Desc => compare_values(right, left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Cross-type ordering: null < number < string < object < array < bool.
pub fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y) {
                let ordering = compare_values(l, r);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(_), Value::Object(_)) => a.to_string().cmp(&b.to_string()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
