use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::{AllocationOutcome, AllocationState, SkipReason};
use crate::core::{AutoNumberError, CounterConfig, Result, Value};
use crate::format;
use crate::hook::CreateContext;
use crate::store::{CasOutcome, CounterStore};

/// Retry budget for the conditional increment. Bounds worst-case latency
/// under contention; on exhaustion the allocation fails instead of
/// looping, and the caller decides whether to retry the whole creation.
pub const MAX_ATTEMPTS: u32 = 5;

/// Drives one auto-number allocation per record-creation event.
///
/// The orchestrator moves through `Init → Checking → Allocating` and
/// terminates in `Succeeded`, `Skipped` or `Failed`. Correctness under
/// concurrent creations rests entirely on the store's version-token
/// compare-and-swap; the orchestrator holds no lock of its own and
/// spawns nothing.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use autonumber::{AutoNumberAllocator, CreateContext, InMemoryCounterStore, SchemaMapping, Value};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = Arc::new(InMemoryCounterStore::new(SchemaMapping::prefixed("new")));
/// store.seed_counter("invoice", "new_invoicenumber", "INV-{PAD:5}{n}", 1).await;
///
/// let allocator = AutoNumberAllocator::new(store);
/// let mut ctx = CreateContext::new("invoice");
/// allocator.handle_create(&mut ctx).await.unwrap();
///
/// assert_eq!(
///     ctx.field("new_invoicenumber"),
///     Some(&Value::Text("INV-00001".into())),
/// );
/// # }
/// ```
pub struct AutoNumberAllocator {
    store: Arc<dyn CounterStore>,
}

impl AutoNumberAllocator {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Entry point for one record-creation event.
    ///
    /// Skips (without error) when the entity type has no active counter
    /// or when the caller already supplied the target field. Otherwise
    /// allocates a number via bounded conditional-increment retries,
    /// renders it, and sets the target field on `ctx`. Persisting the
    /// record itself remains the caller's job.
    pub async fn handle_create(&self, ctx: &mut CreateContext) -> Result<AllocationOutcome> {
        trace!(
            entity_type = %ctx.entity_type(),
            state = %AllocationState::Checking,
            "looking up auto-number policy"
        );

        let Some(counter) = self.store.find_active_counter(ctx.entity_type()).await? else {
            debug!(entity_type = %ctx.entity_type(), "no active counter, skipping");
            return Ok(AllocationOutcome::Skipped(SkipReason::NoPolicy));
        };

        // Never overwrite a caller-supplied value.
        let target_field = counter.target_field.clone();
        if ctx.is_populated(&target_field) {
            debug!(field = %target_field, "target field already populated, skipping");
            return Ok(AllocationOutcome::Skipped(SkipReason::AlreadyPopulated));
        }

        let (value, winning) = self.allocate(counter).await?;

        let rendered = format::render(&winning.format_pattern, value);
        ctx.set_field(target_field, Value::Text(rendered.clone()));

        debug!(
            counter = %winning.id,
            value,
            rendered = %rendered,
            state = %AllocationState::Succeeded,
            "auto number assigned"
        );
        Ok(AllocationOutcome::Succeeded { value, rendered })
    }

    /// The retry loop. Returns the allocated value together with the
    /// counter snapshot that won the race; the winning snapshot carries
    /// the format pattern to render with, which may be fresher than the
    /// one read during the policy lookup.
    async fn allocate(&self, mut counter: CounterConfig) -> Result<(i64, CounterConfig)> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            trace!(
                counter = %counter.id,
                attempts,
                next_value = counter.next_value,
                state = %AllocationState::Allocating,
                "conditional increment attempt"
            );

            match self.store.conditional_increment(&counter).await? {
                CasOutcome::Applied(value) => {
                    debug!(counter = %counter.id, value, attempts, "increment committed");
                    return Ok((value, counter));
                }
                CasOutcome::VersionMismatch => {
                    if attempts >= MAX_ATTEMPTS {
                        warn!(
                            counter = %counter.id,
                            attempts,
                            state = %AllocationState::Failed,
                            "retry budget exhausted"
                        );
                        return Err(AutoNumberError::ConflictExhausted(
                            counter.entity_type,
                            attempts,
                        ));
                    }
                    counter = self.reload_validated(counter).await?;
                }
            }
        }
    }

    /// Re-read the counter after a lost race. The fresh snapshot is
    /// re-validated: a counter that vanished or was deactivated mid-race
    /// aborts the allocation rather than allocating against a policy an
    /// administrator has withdrawn.
    async fn reload_validated(&self, stale: CounterConfig) -> Result<CounterConfig> {
        let fresh = self.store.reload(stale.id).await?;
        if !fresh.is_active {
            return Err(AutoNumberError::CounterDeactivated(stale.id));
        }
        Ok(fresh)
    }
}
