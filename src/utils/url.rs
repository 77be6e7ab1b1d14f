pub use url::Url;

use crate::error::{HarvestError, HarvestResult};

/// Where a page lives, and the two partition keys derived from its hostname
///
/// The domain is the full hostname and keys the Domain Store. The tenant is the
/// first DNS label and is sent to the translation API as a routing header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    pub fn parse(input: &str) -> HarvestResult<Self> {
        let url = Url::parse(input).map_err(|e| HarvestError::location(input, e))?;
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> HarvestResult<Self> {
        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(Self { url }),
            _ => Err(HarvestError::location(url.as_str(), "URL has no hostname")),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Full hostname
    pub fn domain(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// First DNS label of the hostname
    pub fn tenant(&self) -> &str {
        tenant_of(self.domain())
    }
}

pub fn tenant_of(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or(hostname)
}

/// True for http(s) and file URLs, as opposed to plain file paths
pub fn is_url_and_has_protocol(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "file"),
        Err(_) => false,
    }
}
