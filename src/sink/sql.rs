//! SQL planning for the destination table
//!
//! Everything here is pure: column typing, identifier quoting and the
//! statements the writer executes.

use crate::config::JsonColumnType;
use crate::table::{ColumnKind, Table};
use once_cell::sync::Lazy;
use postgres::types::ToSql;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;

/// Surrogate primary key added after the bulk write
pub const SURROGATE_KEY_COLUMN: &str = "_generated_id";

/// PostgreSQL accepts at most this many parameters per statement
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Upper bound on rows per `INSERT`
pub const MAX_BATCH_ROWS: usize = 1_000;

static UNSAFE_IDENT_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// PostgreSQL column type chosen for a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Boolean,
    BigInt,
    DoublePrecision,
    Text,
    Json,
    Jsonb,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::BigInt => "BIGINT",
            SqlType::DoublePrecision => "DOUBLE PRECISION",
            SqlType::Text => "TEXT",
            SqlType::Json => "JSON",
            SqlType::Jsonb => "JSONB",
        }
    }

    fn for_json(json_type: JsonColumnType) -> Self {
        match json_type {
            JsonColumnType::Json => SqlType::Json,
            JsonColumnType::Jsonb => SqlType::Jsonb,
        }
    }

    /// Best-effort type for a scalar column over all of its non-null values.
    ///
    /// Integers and floats widen to `DOUBLE PRECISION`; any other mixture,
    /// strings, and all-null columns fall back to `TEXT`.
    pub fn infer_scalar<'a>(values: impl Iterator<Item = &'a Value>) -> Self {
        let mut current: Option<SqlType> = None;

        for value in values {
            let observed = match value {
                Value::Null => continue,
                Value::Bool(_) => SqlType::Boolean,
                Value::Number(n) if n.is_i64() => SqlType::BigInt,
                Value::Number(_) => SqlType::DoublePrecision,
                _ => SqlType::Text,
            };

            current = Some(match current {
                None => observed,
                Some(existing) if existing == observed => existing,
                Some(SqlType::BigInt | SqlType::DoublePrecision)
                    if matches!(observed, SqlType::BigInt | SqlType::DoublePrecision) =>
                {
                    SqlType::DoublePrecision
                }
                Some(_) => SqlType::Text,
            });

            if current == Some(SqlType::Text) {
                break;
            }
        }

        current.unwrap_or(SqlType::Text)
    }
}

impl Serialize for SqlType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_sql())
    }
}

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Replace characters outside `[A-Za-z0-9_]` with `_`, suffixing duplicates
pub fn sanitize_identifiers<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut used = HashSet::new();
    let mut out = Vec::new();

    for name in names {
        let mut base = UNSAFE_IDENT_CHARS.replace_all(name, "_").into_owned();
        if base.is_empty() {
            base.push('_');
        }

        let mut candidate = base.clone();
        let mut suffix = 2;
        while used.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        used.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

/// Destination column names, in table column order
pub fn destination_names(table: &Table, sanitize: bool) -> Vec<String> {
    if sanitize {
        sanitize_identifiers(table.columns.iter().map(|c| c.name.as_str()))
    } else {
        table.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// How one table column lands in the destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnPlan {
    /// Column name in the destination table
    pub name: String,
    /// Key in the source rows
    pub source: String,
    pub kind: ColumnKind,
    pub sql_type: SqlType,
}

/// Statements and bindings for replacing one table
#[derive(Debug, Clone)]
pub struct TablePlan {
    pub table: String,
    pub columns: Vec<ColumnPlan>,
}

impl TablePlan {
    pub fn new(table: &Table, table_name: &str, json_type: JsonColumnType, sanitize: bool) -> Self {
        let names = destination_names(table, sanitize);

        let columns = table
            .columns
            .iter()
            .zip(names)
            .enumerate()
            .map(|(idx, (column, name))| {
                let sql_type = match column.kind {
                    ColumnKind::Structured => SqlType::for_json(json_type),
                    ColumnKind::Scalar => SqlType::infer_scalar(table.column_values(idx)),
                };
                ColumnPlan {
                    name,
                    source: column.name.clone(),
                    kind: column.kind,
                    sql_type,
                }
            })
            .collect();

        TablePlan {
            table: table_name.to_string(),
            columns,
        }
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(&self.table))
    }

    pub fn create_sql(&self) -> String {
        let definitions: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.sql_type.as_sql()))
            .collect();

        format!(
            "CREATE TABLE {} ({})",
            quote_ident(&self.table),
            definitions.join(", ")
        )
    }

    /// Rows per multi-row `INSERT`, bounded by the protocol's bind parameter limit
    pub fn batch_rows(&self) -> usize {
        if self.columns.is_empty() {
            return 1;
        }
        (MAX_BIND_PARAMS / self.columns.len()).clamp(1, MAX_BATCH_ROWS)
    }

    /// `INSERT` covering `rows` rows; parameters are numbered row by row
    pub fn insert_sql(&self, rows: usize) -> String {
        if self.columns.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES", quote_ident(&self.table));
        }

        let names: Vec<String> = self.columns.iter().map(|c| quote_ident(&c.name)).collect();
        let width = self.columns.len();
        let tuples: Vec<String> = (0..rows)
            .map(|row| {
                // JSON parameters are bound as text and cast server-side
                let placeholders: Vec<String> = self
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(idx, c)| {
                        let n = row * width + idx + 1;
                        match c.sql_type {
                            SqlType::Json | SqlType::Jsonb => {
                                format!("${}::text::{}", n, c.sql_type.as_sql())
                            }
                            _ => format!("${}", n),
                        }
                    })
                    .collect();
                format!("({})", placeholders.join(", "))
            })
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES {}",
            quote_ident(&self.table),
            names.join(", "),
            tuples.join(", ")
        )
    }

    pub fn surrogate_key_sql(&self) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} SERIAL PRIMARY KEY",
            quote_ident(&self.table),
            quote_ident(SURROGATE_KEY_COLUMN)
        )
    }

    /// Parameters for a batch of rows, in `insert_sql` order
    pub fn bind_rows(&self, rows: &[Vec<Value>]) -> Vec<SqlParam> {
        rows.iter().flat_map(|row| self.bind_row(row)).collect()
    }

    /// Convert one table row into typed statement parameters
    pub fn bind_row(&self, row: &[Value]) -> Vec<SqlParam> {
        self.columns
            .iter()
            .zip(row)
            .map(|(column, value)| SqlParam::bind(column.sql_type, value))
            .collect()
    }
}

/// A typed, nullable statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Boolean(Option<bool>),
    BigInt(Option<i64>),
    Double(Option<f64>),
    Text(Option<String>),
}

impl SqlParam {
    pub fn bind(sql_type: SqlType, value: &Value) -> Self {
        match sql_type {
            SqlType::Boolean => SqlParam::Boolean(value.as_bool()),
            SqlType::BigInt => SqlParam::BigInt(value.as_i64()),
            SqlType::DoublePrecision => SqlParam::Double(value.as_f64()),
            SqlType::Text | SqlType::Json | SqlType::Jsonb => SqlParam::Text(match value {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }),
        }
    }

    pub fn as_to_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            SqlParam::Boolean(v) => v,
            SqlParam::BigInt(v) => v,
            SqlParam::Double(v) => v,
            SqlParam::Text(v) => v,
        }
    }
}
