//! Access token sources
//!
//! Tokens are looked up on every call; a missing token disables remote
//! operations until one appears.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::config::constants::TOKEN_STORAGE_KEY;

/// Supplies the bearer token for API calls
pub trait TokenSource: fmt::Debug + Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Fixed token, or a fixed absence of one
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// The page's stored session data
///
/// Accepts either a local-storage dump (an object whose `@nFlow/TOKEN_DATA`
/// entry holds the token data, itself possibly JSON-encoded as a string) or
/// the token data object on its own.
#[derive(Debug, Clone)]
pub struct SessionFileToken {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenData {
    access_token: Option<String>,
}

impl SessionFileToken {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenSource for SessionFileToken {
    fn access_token(&self) -> Option<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("No session data at {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(session) => token_from_session(session),
            Err(e) => {
                tracing::warn!("Unreadable session data in {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

fn token_from_session(session: Value) -> Option<String> {
    let token_data = match session.get(TOKEN_STORAGE_KEY) {
        Some(Value::String(encoded)) => serde_json::from_str::<Value>(encoded).ok()?,
        Some(stored) => stored.clone(),
        None => session,
    };

    serde_json::from_value::<TokenData>(token_data)
        .ok()?
        .access_token
        .filter(|token| !token.is_empty())
}

/// First source that yields a token wins
#[derive(Debug, Default)]
pub struct ChainedTokens {
    sources: Vec<Box<dyn TokenSource>>,
}

impl ChainedTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl TokenSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl TokenSource for ChainedTokens {
    fn access_token(&self) -> Option<String> {
        self.sources.iter().find_map(|source| source.access_token())
    }
}
