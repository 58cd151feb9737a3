pub mod memory;
pub mod schema;

pub use memory::InMemoryCounterStore;
pub use schema::SchemaMapping;

use async_trait::async_trait;

use crate::core::{CounterConfig, CounterId, Result};

/// Outcome of a conditional increment.
///
/// A lost version race is a normal outcome, not an error; whether to
/// retry is the orchestrator's decision, not the store's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The write committed; carries the value that was allocated
    /// (the counter's `next_value` as read before the increment).
    Applied(i64),
    /// The stored version token no longer matched; nothing was written.
    VersionMismatch,
}

/// Access to counter configuration records in a durable store.
///
/// The trait exposes no unconditional write: the version-checked
/// increment is the only mutation path for counter records.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Find the active counter for an entity type, or `None` when the
    /// entity type has no auto-number policy.
    ///
    /// A store misconfigured with duplicate active counters must still
    /// resolve deterministically: the counter with the lowest id wins.
    async fn find_active_counter(&self, entity_type: &str) -> Result<Option<CounterConfig>>;

    /// Attempt to write `next_value = counter.next_value + 1` to the
    /// record identified by `counter.id`, but only while the stored
    /// version token still equals `counter.version`.
    ///
    /// Exactly one write on [`CasOutcome::Applied`]; zero writes on
    /// mismatch or failure.
    async fn conditional_increment(&self, counter: &CounterConfig) -> Result<CasOutcome>;

    /// Re-read a counter record after a lost race to obtain its latest
    /// `next_value` and version token.
    async fn reload(&self, id: CounterId) -> Result<CounterConfig>;
}
