use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CasOutcome, CounterStore, SchemaMapping};
use crate::core::{
    AutoNumberError, CounterConfig, CounterId, Record, Result, Value, VersionToken,
};

/// In-memory counter store with compare-and-swap semantics.
///
/// Reference implementation of [`CounterStore`] for tests and embedded
/// use. Every mutation goes through the version check, the same contract
/// a production store enforces server-side: the write lock is held for
/// the compare and the swap together, and the version token is
/// regenerated on every committed write.
pub struct InMemoryCounterStore {
    mapping: SchemaMapping,
    records: Arc<RwLock<HashMap<CounterId, Record>>>,
}

impl InMemoryCounterStore {
    pub fn new(mapping: SchemaMapping) -> Self {
        Self {
            mapping,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn mapping(&self) -> &SchemaMapping {
        &self.mapping
    }

    /// Insert a counter record. Administrative path, outside the
    /// allocation flow; last write wins on duplicate ids.
    pub async fn insert(&self, record: Record) {
        let mut records = self.records.write().await;
        records.insert(record.id, record);
    }

    /// Seed a fully-populated active counter and return its id.
    pub async fn seed_counter(
        &self,
        entity_type: &str,
        target_field: &str,
        format_pattern: &str,
        next_value: i64,
    ) -> CounterId {
        let mut record = Record::new(CounterId::new());
        record.set(self.mapping.entity_type.clone(), Value::Text(entity_type.into()));
        record.set(self.mapping.target_field.clone(), Value::Text(target_field.into()));
        record.set(
            self.mapping.format_pattern.clone(),
            Value::Text(format_pattern.into()),
        );
        record.set(self.mapping.next_value.clone(), Value::Integer(next_value));
        record.set(self.mapping.is_active.clone(), Value::Boolean(true));

        let id = record.id;
        self.insert(record).await;
        id
    }

    /// Raw record snapshot, mainly for assertions on store state.
    pub async fn raw_record(&self, id: CounterId) -> Option<Record> {
        let records = self.records.read().await;
        records.get(&id).cloned()
    }

    /// Flip a counter's state attribute without touching its version
    /// token (administrative deactivation does not race the CAS).
    pub async fn set_active(&self, id: CounterId, active: bool) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or(AutoNumberError::CounterNotFound(id))?;
        record.set(self.mapping.is_active.clone(), Value::Boolean(active));
        Ok(())
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn find_active_counter(&self, entity_type: &str) -> Result<Option<CounterConfig>> {
        let records = self.records.read().await;

        let mut candidates: Vec<&Record> = records
            .values()
            .filter(|record| {
                record
                    .get(&self.mapping.entity_type)
                    .and_then(Value::as_text)
                    .is_some_and(|name| name == entity_type)
            })
            .collect();
        // Deterministic winner when the store is misconfigured with
        // duplicates: lowest id first.
        candidates.sort_by_key(|record| record.id);

        for record in candidates {
            let config = self.mapping.decode(record)?;
            if config.is_active {
                return Ok(Some(config));
            }
        }
        Ok(None)
    }

    async fn conditional_increment(&self, counter: &CounterConfig) -> Result<CasOutcome> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&counter.id)
            .ok_or(AutoNumberError::CounterNotFound(counter.id))?;

        if record.version != counter.version {
            return Ok(CasOutcome::VersionMismatch);
        }

        record.set(
            self.mapping.next_value.clone(),
            Value::Integer(counter.next_value + 1),
        );
        record.version = VersionToken::fresh();
        record.modified_on = Utc::now();

        Ok(CasOutcome::Applied(counter.next_value))
    }

    async fn reload(&self, id: CounterId) -> Result<CounterConfig> {
        let records = self.records.read().await;
        let record = records
            .get(&id)
            .ok_or(AutoNumberError::CounterNotFound(id))?;
        self.mapping.decode(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryCounterStore {
        InMemoryCounterStore::new(SchemaMapping::prefixed("new"))
    }

    #[tokio::test]
    async fn test_increment_commits_and_bumps_version() {
        let store = store();
        let id = store
            .seed_counter("invoice", "new_invoicenumber", "INV-{n}", 7)
            .await;

        let counter = store.reload(id).await.unwrap();
        let outcome = store.conditional_increment(&counter).await.unwrap();
        assert_eq!(outcome, CasOutcome::Applied(7));

        let fresh = store.reload(id).await.unwrap();
        assert_eq!(fresh.next_value, 8);
        assert_ne!(fresh.version, counter.version);
    }

    #[tokio::test]
    async fn test_stale_version_leaves_record_untouched() {
        let store = store();
        let id = store
            .seed_counter("invoice", "new_invoicenumber", "INV-{n}", 7)
            .await;

        let stale = store.reload(id).await.unwrap();

        // Another writer wins the race first.
        let winner = store.reload(id).await.unwrap();
        store.conditional_increment(&winner).await.unwrap();
        let after_winner = store.raw_record(id).await.unwrap();

        let outcome = store.conditional_increment(&stale).await.unwrap();
        assert_eq!(outcome, CasOutcome::VersionMismatch);

        let after_loser = store.raw_record(id).await.unwrap();
        assert_eq!(after_loser.version, after_winner.version);
        assert_eq!(after_loser.attributes, after_winner.attributes);
    }

    #[tokio::test]
    async fn test_increment_unknown_counter_is_store_failure() {
        let store = store();
        let counter = CounterConfig {
            id: CounterId::new(),
            name: None,
            entity_type: "invoice".into(),
            target_field: "new_invoicenumber".into(),
            format_pattern: "INV-{n}".into(),
            next_value: 3,
            version: VersionToken::fresh(),
            is_active: true,
        };

        let err = store.conditional_increment(&counter).await.unwrap_err();
        assert!(matches!(err, AutoNumberError::CounterNotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_counters_resolve_to_lowest_id() {
        let store = store();
        let first = store
            .seed_counter("invoice", "new_invoicenumber", "A-{n}", 1)
            .await;
        let second = store
            .seed_counter("invoice", "new_invoicenumber", "B-{n}", 100)
            .await;

        let expected = first.min(second);
        let found = store.find_active_counter("invoice").await.unwrap().unwrap();
        assert_eq!(found.id, expected);

        // Stable across repeated lookups.
        for _ in 0..5 {
            let again = store.find_active_counter("invoice").await.unwrap().unwrap();
            assert_eq!(again.id, expected);
        }
    }

    #[tokio::test]
    async fn test_inactive_counters_are_invisible_to_lookup() {
        let store = store();
        let id = store
            .seed_counter("invoice", "new_invoicenumber", "INV-{n}", 1)
            .await;
        store.set_active(id, false).await.unwrap();

        assert!(store.find_active_counter("invoice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_matching_record_surfaces_error() {
        let store = store();
        let mapping = store.mapping().clone();
        let mut record = Record::new(CounterId::new());
        record.set(mapping.entity_type, Value::Text("invoice".into()));
        // No target field or pattern.
        store.insert(record).await;

        let err = store.find_active_counter("invoice").await.unwrap_err();
        assert!(matches!(err, AutoNumberError::MalformedRecord(_)));
    }
}
