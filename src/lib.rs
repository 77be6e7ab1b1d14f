//! # i18n-harvest
//!
//! Harvests `data-i18n` annotations from web pages into per-domain records and
//! edits their translations against a remote translation API.
//!
//! ## Modules
//!
//! - `harvest` - annotation extraction, change watching, document sources
//! - `store` - the persistent per-domain records
//! - `editor` - interactive mode and the translation popup
//! - `remote` - the translation API client
//! - `control` - control surface messages
//! - `page` - page sessions tying the above together
//! - `parsers` - HTML parsing and DOM manipulation
//! - `config`, `env`, `error`, `utils` - ambient plumbing

pub mod config;
pub mod control;
pub mod editor;
pub mod env;
pub mod error;
pub mod harvest;
pub mod page;
pub mod parsers;
pub mod remote;
pub mod store;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::HarvestConfig;
pub use control::{ControlMessage, ControlReply};
pub use error::{HarvestError, HarvestResult};
pub use harvest::{Annotation, Extractor};
pub use page::PageSession;
pub use store::{DomainRecord, DomainStore};
pub use utils::PageLocation;
