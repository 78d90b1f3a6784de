use crate::normalize::RowRecord;
use crate::table::types::{Column, Table};
use serde_json::Value;
use std::collections::HashMap;

/// Project row records into a table.
///
/// Columns are the union of keys across all records in first-seen order.
/// Missing keys become null. A record that is not an object yields an
/// all-null row.
pub fn project_rows(records: Vec<RowRecord>) -> Table {
    let mut columns: Vec<Column> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    // First pass: discover columns
    for record in &records {
        if let Value::Object(obj) = record {
            for key in obj.keys() {
                if !positions.contains_key(key) {
                    positions.insert(key.clone(), columns.len());
                    columns.push(Column::new(key.clone()));
                }
            }
        }
    }

    // Second pass: place values
    let width = columns.len();
    let rows = records
        .into_iter()
        .map(|record| {
            let mut row = vec![Value::Null; width];
            if let Value::Object(obj) = record {
                for (key, value) in obj {
                    if let Some(&idx) = positions.get(&key) {
                        row[idx] = value;
                    }
                }
            }
            row
        })
        .collect();

    Table { columns, rows }
}
