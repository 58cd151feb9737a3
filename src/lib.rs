// ============================================================================
// AutoNumber Library
// ============================================================================

pub mod alloc;
pub mod core;
pub mod format;
pub mod hook;
pub mod store;

// Re-export main types for convenience
pub use crate::core::{
    AutoNumberError, CounterConfig, CounterId, Record, Result, Value, VersionToken,
};
pub use alloc::{AllocationOutcome, AllocationState, AutoNumberAllocator, SkipReason, MAX_ATTEMPTS};
pub use hook::CreateContext;
pub use store::{CasOutcome, CounterStore, InMemoryCounterStore, SchemaMapping};
