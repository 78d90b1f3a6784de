//! The import run: normalize, project, classify, serialize, then write

use crate::config::ImportConfig;
use crate::error::ImportResult;
use crate::normalize::normalize_bytes;
use crate::sink::{destination_names, ColumnPlan, PostgresWriter, SURROGATE_KEY_COLUMN};
use crate::table::{infer_column_kinds, project_rows, serialize_structured, Table};
use log::{info, warn};
use serde::Serialize;

/// Source column that risks being confused with the surrogate key
pub const ID_COLUMN: &str = "id";

/// Input that has been shaped and serialized, ready to preview or write
#[derive(Debug, Clone)]
pub struct PreparedImport {
    pub table: Table,
    pub flattened: bool,
    pub warnings: Vec<String>,
}

/// Result of a completed import
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub table: String,
    pub rows_written: u64,
    pub flattened: bool,
    pub columns: Vec<ColumnPlan>,
    pub warnings: Vec<String>,
}

/// Run every stage up to (not including) the database write.
///
/// Collision warnings are checked against the destination column names, so
/// they follow `config.sanitize_names`.
pub fn prepare_import(bytes: &mut [u8], config: &ImportConfig) -> ImportResult<PreparedImport> {
    info!("Parsing {} byte(s) of JSON", bytes.len());
    let normalized = normalize_bytes(bytes)?;

    let mut table = project_rows(normalized.records);
    let schema = infer_column_kinds(&table);
    serialize_structured(&mut table, &schema);

    info!(
        "Projected {} row(s) into {} column(s), {} structured",
        table.row_count(),
        table.columns.len(),
        table.structured_columns().count()
    );

    let warnings = collision_warnings(&destination_names(&table, config.sanitize_names));
    for warning in &warnings {
        warn!("{}", warning);
    }

    Ok(PreparedImport {
        table,
        flattened: normalized.flattened,
        warnings,
    })
}

/// Write a prepared import to the configured destination
pub fn write_import(prepared: &PreparedImport, config: &ImportConfig) -> ImportResult<ImportReport> {
    let (connection, table_name) = config.require_target()?;

    let summary = PostgresWriter::from_config(config).write(&prepared.table, table_name, connection)?;

    info!(
        "Imported {} row(s) into table '{}'",
        summary.rows_written, summary.table
    );

    Ok(ImportReport {
        table: summary.table,
        rows_written: summary.rows_written,
        flattened: prepared.flattened,
        columns: summary.columns,
        warnings: prepared.warnings.clone(),
    })
}

fn collision_warnings(names: &[String]) -> Vec<String> {
    let has = |wanted: &str| names.iter().any(|name| name == wanted);
    let mut warnings = Vec::new();

    if has(ID_COLUMN) {
        warnings.push(format!(
            "Found '{}' column in JSON; it is kept alongside the generated '{}' primary key",
            ID_COLUMN, SURROGATE_KEY_COLUMN
        ));
    }

    if has(SURROGATE_KEY_COLUMN) {
        warnings.push(format!(
            "Found '{}' column in JSON; no surrogate primary key will be added",
            SURROGATE_KEY_COLUMN
        ));
    }

    warnings
}
