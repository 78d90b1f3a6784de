//! Tabular projection of normalized rows
//!
//! Rows are projected into a [`Table`] with one column per distinct key,
//! each column classified as scalar or structured from a bounded sample,
//! and structured cells serialized to JSON text before they are written.

pub mod types;
pub mod projector;
pub mod inference;
pub mod serializer;

pub use types::{Column, ColumnKind, Table};
pub use projector::project_rows;
pub use inference::{infer_column_kinds, ColumnSchema, STRUCTURED_SAMPLE_SIZE};
pub use serializer::serialize_structured;
