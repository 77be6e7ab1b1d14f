//! # Utilities
//!
//! - `url` - page locations, tenant/domain derivation, URL detection

pub mod url;

pub use url::{is_url_and_has_protocol, tenant_of, PageLocation, Url};
