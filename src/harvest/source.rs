//! Page sources
//!
//! A page is read from a local file or fetched over HTTP(S); the charset the
//! transport declared travels with the bytes.

use std::fmt;
use std::path::PathBuf;

use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::error::HarvestResult;
use crate::parsers::html::{page_to_dom, parse_content_type};
use crate::utils::is_url_and_has_protocol;

/// Where page bytes are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    File(PathBuf),
    Remote(Url),
}

/// Raw page content plus the charset the transport declared, if any
#[derive(Debug, Clone)]
pub struct PageBytes {
    pub data: Vec<u8>,
    pub charset: Option<String>,
}

impl PageBytes {
    pub fn to_dom(&self) -> markup5ever_rcdom::RcDom {
        page_to_dom(&self.data, self.charset.as_deref())
    }
}

impl DocumentSource {
    /// URLs with a protocol are fetched, anything else is read from disk
    pub fn parse(target: &str) -> Self {
        if is_url_and_has_protocol(target) {
            if let Ok(url) = Url::parse(target) {
                if url.scheme() == "file" {
                    if let Ok(path) = url.to_file_path() {
                        return DocumentSource::File(path);
                    }
                }
                return DocumentSource::Remote(url);
            }
        }
        DocumentSource::File(PathBuf::from(target))
    }

    /// The page URL, for remote sources
    pub fn url(&self) -> Option<&Url> {
        match self {
            DocumentSource::Remote(url) => Some(url),
            DocumentSource::File(_) => None,
        }
    }

    pub async fn load(&self, http: &reqwest::Client) -> HarvestResult<PageBytes> {
        match self {
            DocumentSource::File(path) => Ok(PageBytes {
                data: tokio::fs::read(path).await?,
                charset: None,
            }),
            DocumentSource::Remote(url) => {
                let response = http.get(url.clone()).send().await?.error_for_status()?;
                let charset = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(|value| parse_content_type(value).1)
                    .filter(|charset| !charset.is_empty());
                let data = response.bytes().await?.to_vec();
                Ok(PageBytes { data, charset })
            }
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::File(path) => write!(f, "{}", path.display()),
            DocumentSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        assert_eq!(
            DocumentSource::parse("page.html"),
            DocumentSource::File(PathBuf::from("page.html"))
        );
        assert_eq!(
            DocumentSource::parse("file:///tmp/page.html"),
            DocumentSource::File(PathBuf::from("/tmp/page.html"))
        );
        assert!(matches!(
            DocumentSource::parse("https://acme.example.com/"),
            DocumentSource::Remote(_)
        ));
    }

    #[tokio::test]
    async fn test_file_source_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<p data-i18n=\"k\">V</p>").unwrap();

        let http = reqwest::Client::new();
        let page = DocumentSource::File(path).load(&http).await.unwrap();
        assert!(page.charset.is_none());
        assert!(String::from_utf8_lossy(&page.data).contains("data-i18n"));

        let missing = DocumentSource::File(dir.path().join("missing.html"));
        assert!(missing.load(&http).await.is_err());
    }
}
