//! # Parsers
//!
//! - `html` - HTML document parsing, DOM queries and edits, serialization

pub mod html;

pub use html::{html_to_dom, page_to_dom, serialize_document};
