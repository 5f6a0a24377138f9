use thiserror::Error;

use crate::schema::SchemaError;

/// Watcher system errors with structured error types
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("'{field}' is not a column of schema '{schema}'")]
    UnknownField { field: String, schema: String },

    #[error("Schema '{0}' has no columns and cannot be watched")]
    SchemaWithoutColumns(String),

    #[error("No watcher binding registered for schema '{0}'")]
    UnboundSchema(String),

    #[error("Invalid schema definition: {0}")]
    InvalidDefinition(#[from] SchemaError),
}
