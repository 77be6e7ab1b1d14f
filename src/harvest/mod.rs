//! # Harvesting
//!
//! - `extractor` - annotation extraction from a DOM
//! - `watcher` - mutation coalescing, settle subscriptions, polling
//! - `source` - page sources (local files, HTTP)

pub mod extractor;
pub mod source;
pub mod watcher;

pub use extractor::{Annotation, Extractor};
pub use source::{DocumentSource, PageBytes};
pub use watcher::{ChangeWatcher, Poller, SettledCallback};
