pub mod apache;

pub use apache::{CombinedMatcher, CombinedRecord, LogTimestamp};
