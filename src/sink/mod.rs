//! Destination side of an import - replace a PostgreSQL table with the
//! projected rows and add the surrogate key.

pub mod sql;
pub mod writer;

pub use sql::{destination_names, quote_ident, ColumnPlan, SqlParam, SqlType, TablePlan, SURROGATE_KEY_COLUMN};
pub use writer::{PostgresWriter, WriteSummary};
