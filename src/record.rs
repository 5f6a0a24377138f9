use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// System fields that are owned by the persistence layer, not by callers
const SYSTEM_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// Field change information for diff tracking
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub change_type: ChangeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Added,    // Field didn't exist before
    Modified, // Field existed but value changed
    Removed,  // Field was removed
}

impl FieldChange {
    /// Build a change from an old/new value pair; `None` when the values are equal
    pub fn between(field: &str, old: Option<&Value>, new: Option<&Value>) -> Option<Self> {
        let change_type = match (old, new) {
            (None, Some(_)) => ChangeType::Added,
            (Some(_), None) => ChangeType::Removed,
            (Some(old), Some(new)) if old != new => ChangeType::Modified,
            _ => return None,
        };

        Some(Self {
            field: field.to_string(),
            old_value: old.cloned(),
            new_value: new.cloned(),
            change_type,
        })
    }
}

/// Errors that can occur during Record operations
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("System field '{0}' cannot be set via caller input")]
    SystemFieldNotAllowed(&'static str),
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
}

/// A dynamic record that can represent any persisted row, with change tracking
/// and per-field shadow snapshots for watcher dispatch
#[derive(Debug, Clone)]
pub struct Record {
    /// Original state as loaded from storage (None for new records)
    original: Option<HashMap<String, Value>>,
    /// Current field values
    fields: HashMap<String, Value>,
    /// Fields that have been modified since original
    modified_fields: HashSet<String>,
    /// Last-observed values of watched fields, refreshed after every
    /// comparison pass
    shadows: HashMap<String, Value>,
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Record {
    /// Create a new empty record
    pub fn new() -> Self {
        Self {
            original: None,
            fields: HashMap::new(),
            modified_fields: HashSet::new(),
            shadows: HashMap::new(),
        }
    }

    /// Create record from caller input JSON, rejecting system fields
    pub fn from_json(json: Value) -> Result<Self, RecordError> {
        let mut record = Self::new();

        match json {
            Value::Object(map) => {
                for (key, value) in map {
                    if SYSTEM_FIELDS.contains(&key.as_str()) {
                        return Err(RecordError::SystemFieldNotAllowed(
                            SYSTEM_FIELDS
                                .iter()
                                .find(|&&f| f == key)
                                .copied()
                                .unwrap_or("id"),
                        ));
                    }
                    record.fields.insert(key, value);
                }
                Ok(record)
            }
            _ => Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        }
    }

    /// Create record from stored row data (allows system fields)
    pub fn from_stored(data: HashMap<String, Value>) -> Self {
        Self {
            original: Some(data.clone()),
            fields: data,
            modified_fields: HashSet::new(),
            shadows: HashMap::new(),
        }
    }

    /// Inject original data after the fact (for tracking changes against storage)
    pub fn inject(&mut self, original_data: HashMap<String, Value>) -> &mut Self {
        self.original = Some(original_data);
        self
    }

    /// Get field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set field value with automatic change tracking
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();

        // System fields go through set_system_field
        if SYSTEM_FIELDS.contains(&key.as_str()) {
            tracing::warn!("Attempted to set system field '{}' - ignoring", key);
            return self;
        }

        if self.original.is_some() {
            self.modified_fields.insert(key.clone());
        }

        self.fields.insert(key, value.into());
        self
    }

    /// Set system field (for the persistence layer only)
    pub fn set_system_field(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        let key = key.into();

        if self.original.is_some() {
            self.modified_fields.insert(key.clone());
        }

        self.fields.insert(key, value.into());
        self
    }

    /// Remove field and return its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if self.original.is_some() {
            self.modified_fields.insert(key.to_string());
        }
        self.fields.remove(key)
    }

    /// Remove field (chainable)
    pub fn unset(&mut self, key: &str) -> &mut Self {
        self.remove(key);
        self
    }

    // ========================================
    // Standard field accessors
    // ========================================

    /// Get record ID
    pub fn id(&self) -> Option<Uuid> {
        self.get("id").and_then(|v| v.as_str()).and_then(|s| Uuid::parse_str(s).ok())
    }

    /// Set record ID (system field)
    pub fn set_id(&mut self, id: Uuid) -> &mut Self {
        self.set_system_field("id", Value::String(id.to_string()))
    }

    /// Get created_at timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get("created_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Get updated_at timestamp
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.get("updated_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Touch updated_at field (for the persistence layer)
    pub fn touch_updated_at(&mut self) -> &mut Self {
        self.set_system_field("updated_at", Value::String(Utc::now().to_rfc3339()))
    }

    // ========================================
    // Change tracking against original
    // ========================================

    /// Check if a specific field has been changed relative to original
    pub fn changed(&self, key: &str) -> bool {
        match (&self.original, self.fields.get(key)) {
            (Some(original), Some(current)) => original.get(key) != Some(current),
            (Some(original), None) => original.contains_key(key),
            (None, Some(_)) => true, // New field on a fresh record
            (None, None) => false,
        }
    }

    /// Check if record has any changes
    pub fn has_changes(&self) -> bool {
        !self.modified_fields.is_empty() || self.original.is_none()
    }

    /// Get original data (before changes)
    pub fn original(&self) -> Option<&HashMap<String, Value>> {
        self.original.as_ref()
    }

    /// Get original value for a specific field
    pub fn get_original(&self, key: &str) -> Option<&Value> {
        self.original.as_ref()?.get(key)
    }

    /// Get detailed changes for each field
    pub fn changes(&self) -> HashMap<String, FieldChange> {
        let mut changes = HashMap::new();

        if let Some(original) = &self.original {
            for field in &self.modified_fields {
                if let Some(change) =
                    FieldChange::between(field, original.get(field), self.fields.get(field))
                {
                    changes.insert(field.clone(), change);
                }
            }
        } else {
            // For fresh records, all fields are "added"
            for (field, value) in &self.fields {
                changes.insert(
                    field.clone(),
                    FieldChange {
                        field: field.clone(),
                        old_value: None,
                        new_value: Some(value.clone()),
                        change_type: ChangeType::Added,
                    },
                );
            }
        }

        changes
    }

    // ========================================
    // Shadow snapshots
    // ========================================

    /// Get the shadow (last-observed) value for a watched field
    pub fn shadow(&self, key: &str) -> Option<&Value> {
        self.shadows.get(key)
    }

    /// Check whether any shadows have been snapshotted yet
    pub fn has_shadows(&self) -> bool {
        !self.shadows.is_empty()
    }

    /// Refresh shadows for the given fields from current live state.
    /// Fields absent from the record end up absent from the shadows too.
    pub fn snapshot_fields<'a, I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for field in fields {
            match self.fields.get(field) {
                Some(value) => {
                    self.shadows.insert(field.to_string(), value.clone());
                }
                None => {
                    self.shadows.remove(field);
                }
            }
        }
    }

    // ========================================
    // Serialization
    // ========================================

    /// Convert to JSON Value (all fields)
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Convert to HashMap
    pub fn to_hashmap(&self) -> HashMap<String, Value> {
        self.fields.clone()
    }
}

// ========================================
// Conversions
// ========================================

impl From<HashMap<String, Value>> for Record {
    fn from(map: HashMap<String, Value>) -> Self {
        Self::from_stored(map)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_stored(map.into_iter().collect())
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.to_json()
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Record(id: {:?}, fields: {}, changed: {})",
            self.id(),
            self.fields.len(),
            self.has_changes()
        )
    }
}
