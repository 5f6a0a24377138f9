use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use record_watch::{Record, SchemaDef};
use serde_json::{json, Value};

static TRACING: OnceLock<()> = OnceLock::new();

/// Initialize tracing once per test binary; RUST_LOG controls verbosity
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const USERS_SCHEMA_YAML: &str = r#"
name: users
columns:
  - column_name: name
    is_required: true
  - column_name: email
    is_required: true
  - column_name: nickname
    description: optional display alias
"#;

pub fn users_schema() -> SchemaDef {
    SchemaDef::from_yaml(USERS_SCHEMA_YAML).expect("users schema fixture")
}

/// A user record as it would come back from storage
pub fn stored_user(name: &str, email: &str) -> Record {
    let mut data = HashMap::new();
    data.insert("id".to_string(), json!("11111111-1111-1111-1111-111111111111"));
    data.insert("name".to_string(), json!(name));
    data.insert("email".to_string(), json!(email));
    data.insert("created_at".to_string(), json!("2024-01-01T00:00:00+00:00"));
    Record::from_stored(data)
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub label: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

/// Shared capture buffer for watcher callbacks
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a callback that records every invocation under the given label
    pub fn callback(
        &self,
        label: &str,
    ) -> impl Fn(&Record, Option<&Value>, Option<&Value>) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        let label = label.to_string();
        move |_record, old, new| {
            calls.lock().unwrap().push(RecordedCall {
                label: label.clone(),
                old: old.cloned(),
                new: new.cloned(),
            });
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}
