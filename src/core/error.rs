use thiserror::Error;

use super::types::CounterId;

#[derive(Error, Debug)]
pub enum AutoNumberError {
    #[error(
        "A mismatched version of the counter record for '{0}' caused {1} consecutive attempts to fail; try again later"
    )]
    ConflictExhausted(String, u32),

    #[error("Counter record '{0}' not found")]
    CounterNotFound(CounterId),

    #[error("Counter record '{0}' was deactivated during allocation")]
    CounterDeactivated(CounterId),

    #[error("Malformed counter record: {0}")]
    MalformedRecord(String),

    #[error("Schema mapping error: {0}")]
    Schema(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, AutoNumberError>;
