use crate::config::{ConnectionDescriptor, ImportConfig, JsonColumnType};
use crate::error::{ImportError, ImportResult, WriteStage};
use crate::sink::sql::{ColumnPlan, TablePlan, SURROGATE_KEY_COLUMN};
use crate::table::Table;
use log::{info, warn};
use postgres::types::ToSql;
use postgres::{Client, NoTls};

/// Outcome of a successful table write
#[derive(Debug, Clone)]
pub struct WriteSummary {
    pub table: String,
    pub rows_written: u64,
    pub columns: Vec<ColumnPlan>,
}

/// Replaces a table over a blocking PostgreSQL connection.
///
/// The drop, create and multi-row inserts share one transaction. The surrogate key
/// is added by a separate statement after that transaction commits, so a
/// failure there leaves the rows in place without `_generated_id`. With
/// `single_transaction` the key is added before the commit instead.
#[derive(Debug, Clone)]
pub struct PostgresWriter {
    json_type: JsonColumnType,
    sanitize_names: bool,
    single_transaction: bool,
}

impl PostgresWriter {
    pub fn new(json_type: JsonColumnType) -> Self {
        PostgresWriter {
            json_type,
            sanitize_names: false,
            single_transaction: false,
        }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        PostgresWriter::new(config.json_type)
            .with_sanitized_names(config.sanitize_names)
            .with_single_transaction(config.single_transaction)
    }

    pub fn with_sanitized_names(mut self, sanitize: bool) -> Self {
        self.sanitize_names = sanitize;
        self
    }

    pub fn with_single_transaction(mut self, single: bool) -> Self {
        self.single_transaction = single;
        self
    }

    /// Build the statement plan for a table without touching the database
    pub fn plan(&self, table: &Table, table_name: &str) -> TablePlan {
        TablePlan::new(table, table_name, self.json_type, self.sanitize_names)
    }

    /// Connect, replace `table_name` with the table rows, then add the key
    pub fn write(
        &self,
        table: &Table,
        table_name: &str,
        connection: &ConnectionDescriptor,
    ) -> ImportResult<WriteSummary> {
        let plan = self.plan(table, table_name);

        info!("Connecting to {}", connection.redacted());
        let mut client = Client::connect(connection.as_str(), NoTls)
            .map_err(|e| ImportError::connection(e.to_string()))?;

        // The client is dropped on every path out of here, closing the connection
        let rows_written = self.write_with_client(&mut client, &plan, table)?;

        Ok(WriteSummary {
            table: plan.table,
            rows_written,
            columns: plan.columns,
        })
    }

    fn write_with_client(&self, client: &mut Client, plan: &TablePlan, table: &Table) -> ImportResult<u64> {
        let name = plan.table.as_str();

        let mut transaction = client.transaction().map_err(failed(name, WriteStage::Begin))?;

        info!("Replacing table '{}' ({} column(s))", name, plan.columns.len());
        transaction
            .batch_execute(&plan.drop_sql())
            .map_err(failed(name, WriteStage::Replace))?;
        transaction
            .batch_execute(&plan.create_sql())
            .map_err(failed(name, WriteStage::Replace))?;

        // Full batches share one prepared statement; a short final batch gets its own
        let batch_rows = plan.batch_rows();
        let full_batch = transaction
            .prepare(&plan.insert_sql(batch_rows))
            .map_err(failed(name, WriteStage::Insert))?;

        let mut rows_written = 0u64;
        for chunk in table.rows.chunks(batch_rows) {
            let statement = if chunk.len() == batch_rows {
                full_batch.clone()
            } else {
                transaction
                    .prepare(&plan.insert_sql(chunk.len()))
                    .map_err(failed(name, WriteStage::Insert))?
            };

            let params = plan.bind_rows(chunk);
            let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p.as_to_sql()).collect();
            rows_written += transaction
                .execute(&statement, &refs)
                .map_err(failed(name, WriteStage::Insert))?;
        }
        info!("Inserted {} row(s) into '{}'", rows_written, name);

        if self.single_transaction {
            transaction
                .batch_execute(&plan.surrogate_key_sql())
                .map_err(failed(name, WriteStage::SurrogateKey))?;
            transaction.commit().map_err(failed(name, WriteStage::Commit))?;
        } else {
            transaction.commit().map_err(failed(name, WriteStage::Commit))?;
            if let Err(e) = client.batch_execute(&plan.surrogate_key_sql()) {
                warn!(
                    "Rows were committed to '{}' but {} was not added; rerun the import to replace the table",
                    name, SURROGATE_KEY_COLUMN
                );
                return Err(ImportError::write(name, WriteStage::SurrogateKey, e));
            }
        }

        info!("Ensured {} primary key on '{}'", SURROGATE_KEY_COLUMN, name);
        Ok(rows_written)
    }
}

fn failed(table: &str, stage: WriteStage) -> impl FnOnce(postgres::Error) -> ImportError + '_ {
    move |e| ImportError::write(table, stage, e)
}
