//! Shape normalization - turn an arbitrary JSON document into a row list
//!
//! Accepts a JSON array, a single object, or an array of wrapper objects that
//! each hold a `records` array. Wrappers are flattened exactly one level.

use crate::error::{ImportError, ImportResult};
use log::info;
use serde_json::Value;

/// Key whose array values are concatenated when every element carries it
pub const RECORDS_KEY: &str = "records";

/// One logical source row, normally a JSON object
pub type RowRecord = Value;

/// The normalized row list
#[derive(Debug, Clone)]
pub struct NormalizedInput {
    pub records: Vec<RowRecord>,

    /// Whether `records` wrappers were flattened
    pub flattened: bool,
}

/// Parse raw UTF-8 bytes and normalize them into rows
pub fn normalize_bytes(bytes: &mut [u8]) -> ImportResult<NormalizedInput> {
    let document: Value =
        simd_json::serde::from_slice(bytes).map_err(|e| ImportError::parse(e.to_string()))?;
    normalize_value(document)
}

/// Normalize an already parsed document
pub fn normalize_value(document: Value) -> ImportResult<NormalizedInput> {
    // A bare object is always a single row, even when it holds `records`
    let (items, is_list) = match document {
        Value::Array(items) => (items, true),
        other => (vec![other], false),
    };

    let flattened = is_list && has_records_wrappers(&items);
    let records = if flattened {
        let wrapper_count = items.len();
        let records = flatten_records(items);
        info!(
            "Detected nested '{}' arrays in {} wrapper(s), flattened into {} row(s)",
            RECORDS_KEY,
            wrapper_count,
            records.len()
        );
        records
    } else {
        items
    };

    if records.is_empty() {
        return Err(ImportError::EmptyInput);
    }

    Ok(NormalizedInput { records, flattened })
}

/// True when every item is an object holding a `records` array
fn has_records_wrappers(items: &[Value]) -> bool {
    // Vacuously true for an empty list; empty input is rejected afterwards
    items
        .iter()
        .all(|item| matches!(item.get(RECORDS_KEY), Some(Value::Array(_))))
}

fn flatten_records(items: Vec<Value>) -> Vec<Value> {
    let mut rows = Vec::new();
    for item in items {
        if let Value::Object(mut obj) = item {
            if let Some(Value::Array(records)) = obj.remove(RECORDS_KEY) {
                rows.extend(records);
            }
        }
    }
    rows
}
