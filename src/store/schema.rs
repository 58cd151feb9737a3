use serde::{Deserialize, Serialize};

use crate::core::{AutoNumberError, CounterConfig, Record, Result, Value};

/// Field-name table mapping the logical counter attributes onto a
/// store's schema-specific attribute names.
///
/// Deployments that grew under different customization prefixes keep the
/// same logical counter under different attribute names (`new_nextnumber`
/// vs `bupa_nextnumber`, and so on). The mapping keeps the accessor
/// generic and selected via configuration instead of duplicating it per
/// schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMapping {
    /// Logical name of the counter entity itself.
    pub counter_entity: String,
    /// Human-readable counter label (diagnostics only).
    pub name: String,
    /// Entity type the counter applies to (lookup key).
    pub entity_type: String,
    /// Field on target records that receives the rendered number.
    pub target_field: String,
    pub format_pattern: String,
    pub next_value: String,
    /// State attribute; `Boolean(true)` or the state-code convention
    /// `Integer(0)` both read as active.
    pub is_active: String,
}

impl SchemaMapping {
    /// Build a mapping from a customization prefix, e.g. `prefixed("new")`
    /// yields `new_autonumber`, `new_entityname`, `new_fieldname`, ...
    pub fn prefixed(prefix: &str) -> Self {
        Self {
            counter_entity: format!("{prefix}_autonumber"),
            name: format!("{prefix}_name"),
            entity_type: format!("{prefix}_entityname"),
            target_field: format!("{prefix}_fieldname"),
            format_pattern: format!("{prefix}_autonumberstringformat"),
            next_value: format!("{prefix}_nextnumber"),
            is_active: "statecode".to_string(),
        }
    }

    /// Load a mapping from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AutoNumberError::Schema(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| AutoNumberError::Schema(e.to_string()))
    }

    /// Decode a raw record into a typed counter view.
    ///
    /// Entity type, target field and format pattern are required; a
    /// missing next-value attribute defaults to 1 (a freshly authored
    /// counter that has never allocated), and a missing state attribute
    /// reads as inactive.
    pub fn decode(&self, record: &Record) -> Result<CounterConfig> {
        let entity_type = self.required_text(record, &self.entity_type)?;
        let target_field = self.required_text(record, &self.target_field)?;
        let format_pattern = self.required_text(record, &self.format_pattern)?;

        let next_value = match record.get(&self.next_value) {
            Some(Value::Integer(n)) => *n,
            Some(Value::Null) | None => 1,
            Some(other) => {
                return Err(AutoNumberError::MalformedRecord(format!(
                    "attribute '{}' on counter '{}' holds {}, expected INTEGER",
                    self.next_value,
                    record.id,
                    other.type_name()
                )));
            }
        };

        let is_active = match record.get(&self.is_active) {
            Some(Value::Boolean(b)) => *b,
            Some(Value::Integer(code)) => *code == 0,
            Some(Value::Null) | None => false,
            Some(other) => {
                return Err(AutoNumberError::MalformedRecord(format!(
                    "attribute '{}' on counter '{}' holds {}, expected BOOLEAN or INTEGER",
                    self.is_active,
                    record.id,
                    other.type_name()
                )));
            }
        };

        let name = match record.get(&self.name) {
            Some(Value::Text(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };

        Ok(CounterConfig {
            id: record.id,
            name,
            entity_type,
            target_field,
            format_pattern,
            next_value,
            version: record.version,
            is_active,
        })
    }

    fn required_text(&self, record: &Record, attribute: &str) -> Result<String> {
        match record.get(attribute) {
            Some(Value::Text(s)) if !s.is_empty() => Ok(s.clone()),
            Some(other) => Err(AutoNumberError::MalformedRecord(format!(
                "attribute '{}' on counter '{}' holds {}, expected non-empty TEXT",
                attribute,
                record.id,
                other.type_name()
            ))),
            None => Err(AutoNumberError::MalformedRecord(format!(
                "attribute '{}' missing on counter '{}'",
                attribute, record.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CounterId;

    fn sample_record(mapping: &SchemaMapping) -> Record {
        let mut record = Record::new(CounterId::new());
        record.set(mapping.name.clone(), Value::Text("Invoice numbers".into()));
        record.set(mapping.entity_type.clone(), Value::Text("invoice".into()));
        record.set(mapping.target_field.clone(), Value::Text("invoicenumber".into()));
        record.set(
            mapping.format_pattern.clone(),
            Value::Text("INV-{PAD:5}{n}".into()),
        );
        record.set(mapping.next_value.clone(), Value::Integer(12));
        record.set(mapping.is_active.clone(), Value::Integer(0));
        record
    }

    #[test]
    fn test_decode_prefixed_schemas() {
        for prefix in ["new", "bupa"] {
            let mapping = SchemaMapping::prefixed(prefix);
            let record = sample_record(&mapping);

            let config = mapping.decode(&record).unwrap();
            assert_eq!(config.entity_type, "invoice");
            assert_eq!(config.target_field, "invoicenumber");
            assert_eq!(config.format_pattern, "INV-{PAD:5}{n}");
            assert_eq!(config.next_value, 12);
            assert_eq!(config.name.as_deref(), Some("Invoice numbers"));
            assert!(config.is_active);
        }
    }

    #[test]
    fn test_decode_defaults() {
        let mapping = SchemaMapping::prefixed("new");
        let mut record = sample_record(&mapping);
        record.attributes.remove(&mapping.next_value);
        record.attributes.remove(&mapping.is_active);
        record.attributes.remove(&mapping.name);

        let config = mapping.decode(&record).unwrap();
        assert_eq!(config.next_value, 1);
        assert!(!config.is_active);
        assert_eq!(config.name, None);
    }

    #[test]
    fn test_decode_rejects_missing_pattern() {
        let mapping = SchemaMapping::prefixed("new");
        let mut record = sample_record(&mapping);
        record.attributes.remove(&mapping.format_pattern);

        let err = mapping.decode(&record).unwrap_err();
        assert!(matches!(err, AutoNumberError::MalformedRecord(_)));
    }

    #[test]
    fn test_decode_rejects_mistyped_next_value() {
        let mapping = SchemaMapping::prefixed("new");
        let mut record = sample_record(&mapping);
        record.set(mapping.next_value.clone(), Value::Text("twelve".into()));

        let err = mapping.decode(&record).unwrap_err();
        assert!(matches!(err, AutoNumberError::MalformedRecord(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let mapping = SchemaMapping::prefixed("bupa");
        let json = mapping.to_json().unwrap();
        let restored = SchemaMapping::from_json(&json).unwrap();
        assert_eq!(restored, mapping);
    }
}
