use std::fmt;

use thiserror::Error;

pub type ImportResult<T> = Result<T, ImportError>;

/// Everything that can stop an import run.
///
/// Parse and empty-input failures happen before any database interaction.
/// A `Write` failure after the bulk insert committed leaves the table
/// populated but without its surrogate key; rerunning the import replaces it.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Parse(String),
    #[error("JSON file is empty or contains no records")]
    EmptyInput,
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("writing table '{table}' failed while {stage}: {message}")]
    Write {
        table: String,
        stage: WriteStage,
        message: String,
    },
}

impl ImportError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn missing_configuration(message: impl Into<String>) -> Self {
        Self::MissingConfiguration(message.into())
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn write(table: &str, stage: WriteStage, message: impl fmt::Display) -> Self {
        Self::Write {
            table: table.to_string(),
            stage,
            message: message.to_string(),
        }
    }
}

/// Step of the table write that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Begin,
    Replace,
    Insert,
    SurrogateKey,
    Commit,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WriteStage::Begin => "starting the transaction",
            WriteStage::Replace => "replacing the table",
            WriteStage::Insert => "inserting rows",
            WriteStage::SurrogateKey => "adding the _generated_id primary key",
            WriteStage::Commit => "committing",
        };
        f.write_str(label)
    }
}
