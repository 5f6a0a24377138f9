use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::Record;

/// Lifecycle checkpoints at which field comparisons run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    /// Compare just before the record is handed to storage
    BeforePersist,
    /// Compare after storage has accepted the record
    AfterPersist,
}

/// Callback invoked with (record, old value, new value) when a watched field
/// differs between checkpoints. Values are `None` when the field is absent on
/// the corresponding side.
pub type ChangeCallback = Box<dyn Fn(&Record, Option<&Value>, Option<&Value>) + Send + Sync>;

/// A field-name + callback + checkpoint binding. Created by the caller at
/// registration time; immutable thereafter.
pub struct Watcher {
    field: String,
    checkpoint: Checkpoint,
    on_change: ChangeCallback,
}

impl Watcher {
    pub fn new(
        field: impl Into<String>,
        checkpoint: Checkpoint,
        on_change: impl Fn(&Record, Option<&Value>, Option<&Value>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            field: field.into(),
            checkpoint,
            on_change: Box::new(on_change),
        }
    }

    /// Watch a field at the before-persist checkpoint
    pub fn before_persist(
        field: impl Into<String>,
        on_change: impl Fn(&Record, Option<&Value>, Option<&Value>) + Send + Sync + 'static,
    ) -> Self {
        Self::new(field, Checkpoint::BeforePersist, on_change)
    }

    /// Watch a field at the after-persist checkpoint
    pub fn after_persist(
        field: impl Into<String>,
        on_change: impl Fn(&Record, Option<&Value>, Option<&Value>) + Send + Sync + 'static,
    ) -> Self {
        Self::new(field, Checkpoint::AfterPersist, on_change)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }

    pub(crate) fn fire(&self, record: &Record, old: Option<&Value>, new: Option<&Value>) {
        (self.on_change)(record, old, new);
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("field", &self.field)
            .field("checkpoint", &self.checkpoint)
            .finish_non_exhaustive()
    }
}
