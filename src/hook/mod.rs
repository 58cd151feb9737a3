use std::collections::HashMap;

use crate::core::Value;

/// Mutable view of one record-creation event, as handed over by the
/// hosting system.
///
/// This is the whole coupling surface towards the host: the host adapts
/// its own creation event into a context, invokes the allocator, and
/// persists the (possibly modified) field map itself. On success exactly
/// one field is added; on skip the map is untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateContext {
    entity_type: String,
    fields: HashMap<String, Value>,
}

impl CreateContext {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_fields(entity_type: impl Into<String>, fields: HashMap<String, Value>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields,
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// True when the field holds a caller-supplied, non-empty value.
    pub fn is_populated(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(Value::is_populated)
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> HashMap<String, Value> {
        self.fields
    }
}
