pub mod record;
pub mod schema;
pub mod watch;

pub use record::{ChangeType, FieldChange, Record, RecordError};
pub use schema::{ColumnDef, SchemaDef, SchemaError};
pub use watch::{
    BoundWatchers, ChangeCallback, ChangeSet, Checkpoint, WatchError, WatchRegistry, Watcher,
};
