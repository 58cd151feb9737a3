pub mod orchestrator;
pub mod outcome;
pub mod state;

pub use orchestrator::{AutoNumberAllocator, MAX_ATTEMPTS};
pub use outcome::{AllocationOutcome, SkipReason};
pub use state::AllocationState;
