use std::fmt;

/// Lifecycle of one allocation pass.
///
/// `Succeeded`, `Skipped` and `Failed` are terminal; nothing mutates
/// after they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationState {
    Init,
    Checking,
    Allocating,
    Succeeded,
    Skipped,
    Failed,
}

impl fmt::Display for AllocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Checking => "checking",
            Self::Allocating => "allocating",
            Self::Succeeded => "succeeded",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
