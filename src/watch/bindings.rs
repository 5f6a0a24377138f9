use std::collections::HashSet;

use crate::record::{FieldChange, Record};
use crate::schema::SchemaDef;
use crate::watch::error::WatchError;
use crate::watch::watcher::{Checkpoint, Watcher};

/// Field changes observed during one checkpoint pass, one entry per changed
/// field regardless of how many watchers fired for it
#[derive(Debug, Clone)]
pub struct ChangeSet {
    pub checkpoint: Checkpoint,
    pub changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Look up the observed change for a field, if any
    pub fn change(&self, field: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }
}

/// The validated product of watcher registration for one schema: watchers
/// partitioned by checkpoint plus the three lifecycle entry points.
///
/// Binding never mutates the schema or any global state; the host persistence
/// layer owns the instance and drives it at its own lifecycle points.
#[derive(Debug)]
pub struct BoundWatchers {
    schema_name: String,
    /// Every watched field, in first-registration order, across both checkpoints
    watched_fields: Vec<String>,
    before: Vec<Watcher>,
    after: Vec<Watcher>,
}

impl BoundWatchers {
    /// Validate watchers against the schema and partition them by checkpoint.
    /// Fails on the first watcher naming a field the schema does not define.
    pub fn bind(schema: &SchemaDef, watchers: Vec<Watcher>) -> Result<Self, WatchError> {
        if schema.columns.is_empty() {
            return Err(WatchError::SchemaWithoutColumns(schema.name.clone()));
        }

        let mut watched_fields: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut before = Vec::new();
        let mut after = Vec::new();

        for watcher in watchers {
            if !schema.has_column(watcher.field()) {
                return Err(WatchError::UnknownField {
                    field: watcher.field().to_string(),
                    schema: schema.name.clone(),
                });
            }

            if seen.insert(watcher.field().to_string()) {
                watched_fields.push(watcher.field().to_string());
            }

            match watcher.checkpoint() {
                Checkpoint::BeforePersist => before.push(watcher),
                Checkpoint::AfterPersist => after.push(watcher),
            }
        }

        tracing::debug!(
            "Bound {} before-persist and {} after-persist watchers for schema '{}'",
            before.len(),
            after.len(),
            schema.name
        );

        Ok(Self {
            schema_name: schema.name.clone(),
            watched_fields,
            before,
            after,
        })
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn watched_fields(&self) -> &[String] {
        &self.watched_fields
    }

    /// True when no watchers were registered at either checkpoint
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    /// Lifecycle entry point: record was just constructed or loaded.
    /// Snapshots watched fields; runs no comparisons.
    pub fn record_initialized(&self, record: &mut Record) {
        record.snapshot_fields(self.watched_fields.iter().map(String::as_str));
        tracing::trace!(
            "Initialized {} shadows for schema '{}'",
            self.watched_fields.len(),
            self.schema_name
        );
    }

    /// Lifecycle entry point: record is about to be persisted
    pub fn before_persist(&self, record: &mut Record) -> ChangeSet {
        self.run_checkpoint(Checkpoint::BeforePersist, record)
    }

    /// Lifecycle entry point: record was persisted
    pub fn after_persist(&self, record: &mut Record) -> ChangeSet {
        self.run_checkpoint(Checkpoint::AfterPersist, record)
    }

    /// Compare shadows to live values for the watchers active at this
    /// checkpoint, fire callbacks for differences, then refresh all shadows
    /// from current live state whether or not anything fired.
    fn run_checkpoint(&self, checkpoint: Checkpoint, record: &mut Record) -> ChangeSet {
        let active = match checkpoint {
            Checkpoint::BeforePersist => &self.before,
            Checkpoint::AfterPersist => &self.after,
        };

        let mut changes: Vec<FieldChange> = Vec::new();
        let mut reported: HashSet<&str> = HashSet::new();

        for watcher in active {
            let field = watcher.field();
            let old = record.shadow(field);
            let new = record.get(field);

            let Some(change) = FieldChange::between(field, old, new) else {
                tracing::trace!(
                    "Watcher on '{}.{}' skipped - value unchanged at {:?}",
                    self.schema_name,
                    field,
                    checkpoint
                );
                continue;
            };

            tracing::debug!(
                "Watcher fired for '{}.{}' at {:?} (record {:?})",
                self.schema_name,
                field,
                checkpoint,
                record.id()
            );
            watcher.fire(record, old, new);

            if reported.insert(field) {
                changes.push(change);
            }
        }

        // Shadows track every watched field, not just the ones active at this
        // checkpoint, so the other checkpoint never re-reports a stale diff.
        record.snapshot_fields(self.watched_fields.iter().map(String::as_str));

        ChangeSet { checkpoint, changes }
    }
}
