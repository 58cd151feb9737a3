use super::AllocationState;

/// Terminal result of an allocation pass over one record creation.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationOutcome {
    /// A number was allocated and the rendered string written into the
    /// target field of the creation context.
    Succeeded { value: i64, rendered: String },
    /// This creation needed no number; nothing was read beyond the
    /// lookup and nothing was written.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No active counter is configured for the entity type.
    NoPolicy,
    /// The caller already supplied a value for the target field.
    AlreadyPopulated,
}

impl AllocationOutcome {
    pub fn state(&self) -> AllocationState {
        match self {
            Self::Succeeded { .. } => AllocationState::Succeeded,
            Self::Skipped(_) => AllocationState::Skipped,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}
