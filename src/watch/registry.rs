use std::collections::HashMap;

use crate::record::Record;
use crate::schema::SchemaDef;
use crate::watch::bindings::{BoundWatchers, ChangeSet};
use crate::watch::error::WatchError;
use crate::watch::watcher::Watcher;

/// Caller-owned registry of watcher bindings keyed by schema name.
///
/// Replaces the kind of process-global dispatch table a host framework would
/// provide: the host constructs one, registers bindings, and routes its own
/// lifecycle events through it. One live binding per schema; re-registering a
/// schema replaces the previous binding.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    bindings: HashMap<String, BoundWatchers>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self { bindings: HashMap::new() }
    }

    /// Validate and bind watchers for a schema. A prior binding for the same
    /// schema name is replaced wholesale.
    pub fn register(&mut self, schema: &SchemaDef, watchers: Vec<Watcher>) -> Result<(), WatchError> {
        let bound = BoundWatchers::bind(schema, watchers)?;

        if self.bindings.insert(schema.name.clone(), bound).is_some() {
            tracing::debug!("Replaced existing watcher binding for schema '{}'", schema.name);
        } else {
            tracing::debug!("Registered watcher binding for schema '{}'", schema.name);
        }

        Ok(())
    }

    /// Remove the binding for a schema, returning it if one existed
    pub fn unregister(&mut self, schema_name: &str) -> Option<BoundWatchers> {
        self.bindings.remove(schema_name)
    }

    /// Look up the binding for a schema
    pub fn binding(&self, schema_name: &str) -> Option<&BoundWatchers> {
        self.bindings.get(schema_name)
    }

    pub fn is_registered(&self, schema_name: &str) -> bool {
        self.bindings.contains_key(schema_name)
    }

    /// Names of all schemas with live bindings
    pub fn schemas(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    fn binding_or_err(&self, schema_name: &str) -> Result<&BoundWatchers, WatchError> {
        self.bindings
            .get(schema_name)
            .ok_or_else(|| WatchError::UnboundSchema(schema_name.to_string()))
    }

    /// Route a record-initialized event to the schema's binding
    pub fn record_initialized(&self, schema_name: &str, record: &mut Record) -> Result<(), WatchError> {
        self.binding_or_err(schema_name)?.record_initialized(record);
        Ok(())
    }

    /// Route a before-persist event to the schema's binding
    pub fn before_persist(&self, schema_name: &str, record: &mut Record) -> Result<ChangeSet, WatchError> {
        Ok(self.binding_or_err(schema_name)?.before_persist(record))
    }

    /// Route an after-persist event to the schema's binding
    pub fn after_persist(&self, schema_name: &str, record: &mut Record) -> Result<ChangeSet, WatchError> {
        Ok(self.binding_or_err(schema_name)?.after_persist(record))
    }
}
