//! Bridge between JSON data and gtmpl values

use std::cmp::Ordering;
use std::collections::HashMap;

use gtmpl_value::{Number, Value};
use serde_json::Value as JsonValue;

/// Convert render data into the engine's value model. Objects become maps, so
/// a missing key reads as `NoValue` instead of failing.
pub fn from_json(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Nil,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or_default())
            }
        }
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        JsonValue::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

/// Follow a dotted `path` from `base`; `None` as soon as a segment is missing
pub fn resolve_path<'v>(base: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(base, |current, segment| match current {
        Value::Map(map) | Value::Object(map) => map.get(segment),
        _ => None,
    })
}

/// Printed form. Missing and nil values print as empty; maps print sorted.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::NoValue | Value::Nil | Value::Function(_) => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(to_text).collect();
            format!("[{}]", parts.join(" "))
        }
        Value::Map(map) | Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let parts: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{k}:{}", to_text(v)))
                .collect();
            format!("map[{}]", parts.join(" "))
        }
    }
}

pub fn truthy(value: &Value) -> bool {
    match value {
        Value::NoValue | Value::Nil => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Map(map) | Value::Object(map) => !map.is_empty(),
        Value::Function(_) => true,
        Value::Number(n) => as_float(n).abs() > f64::EPSILON,
    }
}

pub fn is_missing(value: &Value) -> bool {
    matches!(value, Value::NoValue | Value::Nil)
}

#[allow(clippy::cast_precision_loss)]
fn as_float(n: &Number) -> f64 {
    n.as_f64()
        .or_else(|| n.as_i64().map(|i| i as f64))
        .or_else(|| n.as_u64().map(|u| u as f64))
        .unwrap_or(f64::NAN)
}

/// Numeric ordering across integer and float representations
pub fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => match (a.as_u64(), b.as_u64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => as_float(a).partial_cmp(&as_float(b)),
        },
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::NoValue | Value::Nil => "nil",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Map(_) | Value::Object(_) => "map",
        Value::Function(_) => "function",
    }
}
