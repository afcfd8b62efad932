//! Locate the list of class records inside a class-list payload.
//!
//! The same logical query ("this room's classes") comes back as a bare array,
//! as `{"clases": [...]}`, as a dictionary keyed by numeric id, or wrapped in
//! further metadata arrays depending on the backend code path. The extractor
//! sniffs the structure instead of committing to one envelope.

use crate::model::{ClassBlock, RawClassRecord};
use crate::observability;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Deepest nesting the search will descend into.
pub const MAX_DEPTH: usize = 16;

/// Wrapper keys, searched in this order before any other key.
const CLASS_COLLECTION_KEYS: [&str; 5] = ["clases", "horarios", "results", "items", "data"];

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(_) => true,
    }
}

/// An object with a day and at least one time, or with an assignment or
/// room reference.
pub fn looks_like_class_record(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let has_schedule = is_present(obj.get("dia"))
        && (is_present(obj.get("hora_inicio")) || is_present(obj.get("hora_fin")));
    has_schedule || is_truthy(obj.get("asignacion")) || is_truthy(obj.get("aula"))
}

fn is_numeric_key_map(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map
            .keys()
            .all(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()))
}

fn record_like<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<&'a Value> {
    values.filter(|v| looks_like_class_record(v)).collect()
}

fn first_non_empty<'a>(
    values: impl Iterator<Item = &'a Value>,
    depth: usize,
    visited: &mut HashSet<*const Value>,
) -> Vec<&'a Value> {
    for nested in values {
        let found = find_records(nested, depth + 1, visited);
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

fn find_records<'a>(
    value: &'a Value,
    depth: usize,
    visited: &mut HashSet<*const Value>,
) -> Vec<&'a Value> {
    if depth > MAX_DEPTH || !visited.insert(value as *const Value) {
        return Vec::new();
    }

    match value {
        Value::Array(items) => {
            let records = record_like(items.iter());
            if !records.is_empty() {
                return records;
            }
            first_non_empty(items.iter(), depth, visited)
        }
        Value::Object(map) => {
            if looks_like_class_record(value) {
                return vec![value];
            }

            if is_numeric_key_map(map) {
                let records = record_like(map.values());
                if !records.is_empty() {
                    return records;
                }
            }

            for key in CLASS_COLLECTION_KEYS {
                if let Some(nested) = map.get(key) {
                    let found = find_records(nested, depth + 1, visited);
                    if !found.is_empty() {
                        return found;
                    }
                }
            }

            let records = record_like(map.values());
            if !records.is_empty() {
                return records;
            }
            first_non_empty(map.values(), depth, visited)
        }
        _ => Vec::new(),
    }
}

/// Raw class records found in `payload`; empty when nothing matches.
pub fn extract_class_list(payload: &Value) -> Vec<Value> {
    if let Value::Array(items) = payload {
        return items.clone();
    }
    let mut visited = HashSet::new();
    find_records(payload, 0, &mut visited)
        .into_iter()
        .cloned()
        .collect()
}

/// Extract and sanitize every record. Non-object entries are skipped; invalid
/// blocks are kept so callers can report them.
pub fn normalize_class_list(payload: &Value) -> Vec<ClassBlock> {
    extract_class_list(payload)
        .iter()
        .filter_map(RawClassRecord::from_value)
        .map(|record| ClassBlock::from_record(&record))
        .collect()
}

/// Blocks ready for grid layout or conflict checks.
pub fn valid_blocks(payload: &Value) -> Vec<ClassBlock> {
    let all = normalize_class_list(payload);
    let total = all.len();
    let valid: Vec<ClassBlock> = all.into_iter().filter(ClassBlock::is_valid).collect();
    let dropped = total - valid.len();
    if dropped > 0 {
        tracing::warn!(dropped, total, "class list contained incomplete entries; skipped");
        observability::record_dropped_records(dropped);
    }
    valid
}
