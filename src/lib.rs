//! # json2pg - JSON to PostgreSQL importer
//!
//! Loads a JSON document into a single PostgreSQL table.
//!
//! ## Pipeline
//!
//! - **normalize**: coerce an object or array into a row list, flattening
//!   one level of `records` wrappers
//! - **table**: project rows into columns, classify columns as scalar or
//!   structured, serialize structured cells to JSON text
//! - **preview**: render the first rows for the operator
//! - **sink**: replace the target table and add a `_generated_id` key
//!
//! ## Quick Start
//!
//! ```rust
//! use json2pg::{prepare_import, render_preview, ColumnKind, ImportConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut input = br#"[{"id":1,"tags":["a","b"]},{"id":2,"tags":["c"]}]"#.to_vec();
//! let prepared = prepare_import(&mut input, &ImportConfig::default())?;
//!
//! assert_eq!(prepared.table.columns[1].kind, ColumnKind::Structured);
//! println!("{}", render_preview(&prepared.table, 5));
//! # Ok(())
//! # }
//! ```
//!
//! Writing requires a connection string and a table name in
//! [`ImportConfig`]; see [`import_json`].

pub mod config;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod preview;
pub mod sink;
pub mod table;

// Re-export commonly used types for convenience
pub use config::{ConnectionDescriptor, ImportConfig, JsonColumnType};
pub use error::{ImportError, ImportResult, WriteStage};
pub use normalize::{normalize_bytes, normalize_value, NormalizedInput, RowRecord};
pub use pipeline::{prepare_import, write_import, ImportReport, PreparedImport};
pub use preview::render_preview;
pub use sink::{PostgresWriter, SqlType, TablePlan};
pub use table::{Column, ColumnKind, Table, STRUCTURED_SAMPLE_SIZE};

/// Main entry point: import raw JSON bytes into the configured table
pub fn import_json(bytes: &mut [u8], config: &ImportConfig) -> ImportResult<ImportReport> {
    let prepared = prepare_import(bytes, config)?;
    write_import(&prepared, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_checked_after_parsing() {
        let mut malformed = b"{\"a\":".to_vec();
        let err = import_json(&mut malformed, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));

        let mut valid = b"[{\"a\": 1}]".to_vec();
        let err = import_json(&mut valid, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::MissingConfiguration(_)));
    }
}
