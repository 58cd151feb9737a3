pub mod error;
pub mod types;
pub mod value;

pub use error::{AutoNumberError, Result};
pub use types::{CounterConfig, CounterId, Record, VersionToken};
pub use value::Value;
