//! # Remote translation API
//!
//! - `client` - the three API calls, tagged fallbacks, key patching
//! - `document` - dotted-path lookup and patching of translation documents
//! - `token` - where the bearer token comes from

pub mod client;
pub mod document;
pub mod token;

pub use client::{ClientError, Fetched, TranslationClient};
pub use document::TranslationDocument;
pub use token::{ChainedTokens, SessionFileToken, StaticToken, TokenSource};
