//! Typed environment variable overrides
//!
//! Each variable is a unit struct implementing [`EnvVar`]; the config layer reads
//! them after the configuration file so the environment always wins.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable parse error
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// Accessor for one environment variable
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// `Ok(None)` when unset, an error only when set to something unparsable
    fn lookup() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// Process-level variables
pub mod core {
    use super::*;

    /// Log level
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "I18N_HARVEST_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// Colored terminal output
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            Ok(!value.is_empty())
        }
    }
}

/// Annotation harvesting variables
pub mod harvest {
    use super::*;

    /// Marker attribute carrying the translation key
    pub struct MarkerAttribute;
    impl EnvVar<String> for MarkerAttribute {
        const NAME: &'static str = "I18N_HARVEST_MARKER";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Attribute that tags elements with a translation key";

        fn parse(value: &str) -> EnvResult<String> {
            let attr = value.trim();
            if attr.is_empty() || attr.chars().any(char::is_whitespace) {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Attribute name must be a single non-empty token".to_string(),
                });
            }
            Ok(attr.to_lowercase())
        }
    }

    /// Poll interval of the watcher
    pub struct PollInterval;
    impl EnvVar<Duration> for PollInterval {
        const NAME: &'static str = "I18N_HARVEST_POLL_INTERVAL_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(2000));
        const DESCRIPTION: &'static str = "Interval between document polls in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_bounded_u64(value, Self::NAME, 100, 3_600_000).map(Duration::from_millis)
        }
    }
}

/// Domain store variables
pub mod store {
    use super::*;

    /// Database file location
    pub struct Path;
    impl EnvVar<PathBuf> for Path {
        const NAME: &'static str = "I18N_HARVEST_STORE_PATH";
        const DEFAULT: Option<PathBuf> = None;
        const DESCRIPTION: &'static str = "Location of the per-domain record database";

        fn parse(value: &str) -> EnvResult<PathBuf> {
            let path = value.trim();
            if path.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Path must not be empty".to_string(),
                });
            }
            Ok(PathBuf::from(path))
        }
    }
}

/// Remote translation API variables
pub mod remote {
    use super::*;

    /// Override for the API origin
    pub struct ApiBase;
    impl EnvVar<String> for ApiBase {
        const NAME: &'static str = "I18N_HARVEST_API_BASE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str =
            "Translation API origin; defaults to https://<page hostname>";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.trim_end_matches('/').to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// Access token, bypassing the session file
    pub struct AccessToken;
    impl EnvVar<String> for AccessToken {
        const NAME: &'static str = "I18N_HARVEST_ACCESS_TOKEN";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Bearer token for the translation API";

        fn parse(value: &str) -> EnvResult<String> {
            let token = value.trim();
            if token.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Token must not be empty".to_string(),
                });
            }
            Ok(token.to_string())
        }
    }

    /// Session file holding the page's token data
    pub struct SessionFile;
    impl EnvVar<PathBuf> for SessionFile {
        const NAME: &'static str = "I18N_HARVEST_SESSION_FILE";
        const DEFAULT: Option<PathBuf> = None;
        const DESCRIPTION: &'static str =
            "JSON file with the page session (local-storage dump or token object)";

        fn parse(value: &str) -> EnvResult<PathBuf> {
            Ok(PathBuf::from(value.trim()))
        }
    }
}

fn parse_bounded_u64(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<u64> {
    let num: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// Markdown list of every supported variable
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    let rows = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION),
        (harvest::MarkerAttribute::NAME, harvest::MarkerAttribute::DESCRIPTION),
        (harvest::PollInterval::NAME, harvest::PollInterval::DESCRIPTION),
        (store::Path::NAME, store::Path::DESCRIPTION),
        (remote::ApiBase::NAME, remote::ApiBase::DESCRIPTION),
        (remote::AccessToken::NAME, remote::AccessToken::DESCRIPTION),
        (remote::SessionFile::NAME, remote::SessionFile::DESCRIPTION),
    ];
    for (name, description) in rows {
        docs.push_str(&format!("- `{}`: {}\n", name, description));
    }

    docs
}
