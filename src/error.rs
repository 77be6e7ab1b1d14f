//! Crate-wide error handling
//!
//! Every layer reports through [`HarvestError`]. Remote calls degrade to
//! fallbacks tagged with the narrower [`ClientError`]; callers that want a hard
//! failure instead convert it with `?`.

use thiserror::Error;

use crate::env::EnvError;
use crate::remote::ClientError;

/// Errors raised by the harvesting library
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Environment override could not be parsed
    #[error(transparent)]
    Env(#[from] EnvError),

    /// Page URL is malformed or has no host to partition records by
    #[error("invalid page location '{0}': {1}")]
    Location(String, String),

    /// Reading a page or a local file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fetching a remote page failed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A stored record or message could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The on-disk store reported a failure
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// A translation API call fell back
    #[error("translation API: {0}")]
    Remote(#[from] ClientError),

    /// A requested record or translation does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

/// Shorthand used across the crate
pub type HarvestResult<T> = Result<T, HarvestError>;

impl HarvestError {
    /// Creates a location error for the given input
    pub fn location<T: std::fmt::Display>(input: &str, reason: T) -> Self {
        HarvestError::Location(input.to_string(), reason.to_string())
    }

    /// True when the failure came from persistent storage
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            HarvestError::Storage(_) | HarvestError::Serialization(_)
        )
    }
}

macro_rules! storage_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for HarvestError {
                fn from(err: $ty) -> Self {
                    HarvestError::Storage(redb::Error::from(err))
                }
            }
        )+
    };
}

storage_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
