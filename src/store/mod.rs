//! # Domain store
//!
//! - `record` - the ordered, key-deduplicated record and its persisted shape
//! - `domain_store` - `redb`-backed persistence keyed by domain

pub mod domain_store;
pub mod record;

pub use domain_store::{DomainStore, MergeOutcome};
pub use record::{DomainRecord, Entry};
