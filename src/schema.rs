use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors that can occur while loading schema definitions
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid JSON schema definition: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid YAML schema definition: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Column descriptor within a schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub column_name: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ColumnDef {
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            is_required: false,
            default_value: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }
}

/// Record-type descriptor: a named schema plus its column list.
/// Watcher registration validates watched fields against this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDef {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

impl SchemaDef {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self { name: name.into(), columns }
    }

    /// Load a schema definition from a JSON document
    pub fn from_json(json: Value) -> Result<Self, SchemaError> {
        Ok(serde_json::from_value(json)?)
    }

    /// Load a schema definition from a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.column_name == name)
    }

    /// Check whether a column exists on this schema
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// All column names, in definition order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.column_name.as_str())
    }
}
