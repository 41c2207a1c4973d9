//! Value ordering used by "order by child" queries.
//!
//! Rank of a child value: missing/null < false < true < numbers < strings < objects/arrays.
//! Numbers compare numerically, strings lexicographically by bytes; values of equal
//! rank that still compare equal fall back to the child key.

use std::cmp::Ordering;

use serde_json::Value;

fn rank(v: Option<&Value>) -> u8 {
    match v {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(false)) => 1,
        Some(Value::Bool(true)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_)) | Some(Value::Object(_)) => 5,
    }
}

/// Compare two optional child values by store order, ignoring keys.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (ra, rb) = (rank(a), rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let fx = x.as_f64().unwrap_or(0.0);
            let fy = y.as_f64().unwrap_or(0.0);
            fx.total_cmp(&fy)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Order two children `(key, value)` by `value[field]`, then by key.
pub fn compare_children(field: &str, a: (&str, &Value), b: (&str, &Value)) -> Ordering {
    compare_values(a.1.get(field), b.1.get(field)).then_with(|| a.0.cmp(b.0))
}
