//! Scalar vs. structured column classification
//!
//! Each column is classified from a bounded prefix of its non-null values.
//! A column whose first object or array appears after the sample window is
//! classified as scalar; the window trades accuracy for a linear, bounded scan.

use crate::table::types::{ColumnKind, Table};
use log::debug;
use serde_json::Value;

/// Number of non-null values sampled per column
pub const STRUCTURED_SAMPLE_SIZE: usize = 10;

/// Inferred kind for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
}

/// Classify every column of the table, in column order
pub fn infer_column_kinds(table: &Table) -> Vec<ColumnSchema> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let kind = classify(table.column_values(idx));
            debug!("Column '{}' classified as {:?}", column.name, kind);
            ColumnSchema {
                name: column.name.clone(),
                kind,
            }
        })
        .collect()
}

fn classify<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnKind {
    let structured = values
        .filter(|v| !v.is_null())
        .take(STRUCTURED_SAMPLE_SIZE)
        .any(|v| matches!(v, Value::Object(_) | Value::Array(_)));

    if structured {
        ColumnKind::Structured
    } else {
        ColumnKind::Scalar
    }
}
