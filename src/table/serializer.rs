use crate::table::types::{ColumnKind, Table};
use crate::table::inference::ColumnSchema;
use serde_json::Value;

/// Apply inferred kinds and replace every non-null structured cell with its
/// JSON text. Nulls stay null; scalar columns are left untouched.
pub fn serialize_structured(table: &mut Table, schema: &[ColumnSchema]) {
    for column in schema {
        table.set_kind(&column.name, column.kind);
    }

    let structured: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind == ColumnKind::Structured)
        .map(|(idx, _)| idx)
        .collect();

    if structured.is_empty() {
        return;
    }

    for row in &mut table.rows {
        for &idx in &structured {
            let cell = &mut row[idx];
            if !cell.is_null() {
                // Display for Value is infallible compact JSON
                *cell = Value::String(cell.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{infer_column_kinds, project_rows};
    use serde_json::json;

    fn prepared(records: Vec<Value>) -> Table {
        let mut table = project_rows(records);
        let schema = infer_column_kinds(&table);
        serialize_structured(&mut table, &schema);
        table
    }

    #[test]
    fn test_structured_cells_become_json_text() {
        let table = prepared(vec![
            json!({"id": 1, "tags": ["a", "b"]}),
            json!({"id": 2, "tags": ["c"]}),
        ]);

        assert_eq!(table.columns[1].kind, ColumnKind::Structured);
        assert_eq!(table.rows[0], vec![json!(1), json!(r#"["a","b"]"#)]);
        assert_eq!(table.rows[1], vec![json!(2), json!(r#"["c"]"#)]);
    }

    #[test]
    fn test_serialized_text_parses_back_to_original() {
        let original = json!({"nested": {"deep": [1, 2.5, null, "x"]}, "flag": true});
        let table = prepared(vec![json!({"payload": original.clone()})]);

        let text = table.rows[0][0].as_str().unwrap();
        let reparsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_nulls_stay_null() {
        let table = prepared(vec![json!({"obj": {"a": 1}}), json!({"obj": null}), json!({})]);
        assert_eq!(table.rows[1][0], Value::Null);
        assert_eq!(table.rows[2][0], Value::Null);
    }

    #[test]
    fn test_scalar_columns_untouched_and_shape_preserved() {
        let records = vec![json!({"s": "text", "n": 1.5, "o": [1]}), json!({"s": "more"})];
        let table = prepared(records);

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.rows[0][0], json!("text"));
        assert_eq!(table.rows[0][1], json!(1.5));
        assert_eq!(table.rows[0][2], json!("[1]"));
    }

    #[test]
    fn test_structured_string_values_are_quoted() {
        // a string inside a structured column is serialized as a JSON string
        let table = prepared(vec![json!({"mixed": {"a": 1}}), json!({"mixed": "plain"})]);
        assert_eq!(table.rows[1][0], json!("\"plain\""));
    }
}
