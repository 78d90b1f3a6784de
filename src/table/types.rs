use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a column holds plain scalars or JSON objects/arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Scalar,
    Structured,
}

/// A named column of the projected table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            kind: ColumnKind::Scalar,
        }
    }
}

/// Row-major table; every row has exactly one value per column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of one column in row order
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    pub fn structured_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Structured)
    }

    /// Record the kinds computed by the inferencer
    pub fn set_kind(&mut self, name: &str, kind: ColumnKind) {
        if let Some(column) = self.columns.iter_mut().find(|c| c.name == name) {
            column.kind = kind;
        }
    }
}
