//! Translation API client
//!
//! Every call degrades instead of failing: the caller always receives a usable
//! value (empty language list, empty document, unit). [`Fetched`] tags that
//! value so callers can still tell a genuine result from a fallback.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::document::TranslationDocument;
use super::token::TokenSource;
use crate::config::constants::TENANT_HEADER;
use crate::error::{HarvestError, HarvestResult};
use crate::utils::PageLocation;

/// Why a remote call fell back
#[derive(Error, Debug)]
pub enum ClientError {
    /// No access token; the request was never sent
    #[error("access token not available")]
    MissingToken,

    /// Network failure, non-2xx status, or unparsable body
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint URL could not be built
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

impl ClientError {
    pub fn is_missing_token(&self) -> bool {
        matches!(self, ClientError::MissingToken)
    }
}

/// Result of a remote call: the real value, or the fallback and its cause
#[derive(Debug)]
pub enum Fetched<T> {
    Loaded(T),
    Fallback { value: T, error: ClientError },
}

impl<T> Fetched<T> {
    pub fn value(&self) -> &T {
        match self {
            Fetched::Loaded(value) | Fetched::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Fetched::Loaded(value) | Fetched::Fallback { value, .. } => value,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Fetched::Loaded(_))
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Fetched::Loaded(_) => None,
            Fetched::Fallback { error, .. } => Some(error),
        }
    }

    /// The value on success, the cause otherwise
    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            Fetched::Loaded(value) => Ok(value),
            Fetched::Fallback { error, .. } => Err(error),
        }
    }

    fn from_result(result: Result<T, ClientError>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => Fetched::Loaded(value),
            Err(error) => Fetched::Fallback {
                value: fallback(),
                error,
            },
        }
    }
}

#[derive(Deserialize)]
struct InfoResponse {
    #[serde(default)]
    languages: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct TranslationResponse {
    #[serde(default)]
    translation: Option<Value>,
}

#[derive(Serialize)]
struct TranslationBody<'a> {
    translation: &'a TranslationDocument,
}

/// Client for one page's translation API
#[derive(Debug, Clone)]
pub struct TranslationClient {
    http: reqwest::Client,
    base: Url,
    tenant: String,
    tokens: Arc<dyn TokenSource>,
}

impl TranslationClient {
    /// API at `https://<page hostname>` unless `api_base` overrides the origin
    pub fn new(
        location: &PageLocation,
        api_base: Option<&str>,
        tokens: Arc<dyn TokenSource>,
    ) -> HarvestResult<Self> {
        Self::with_http(reqwest::Client::new(), location, api_base, tokens)
    }

    pub fn with_http(
        http: reqwest::Client,
        location: &PageLocation,
        api_base: Option<&str>,
        tokens: Arc<dyn TokenSource>,
    ) -> HarvestResult<Self> {
        let origin = match api_base {
            Some(base) => base.to_string(),
            None => format!("https://{}", location.domain()),
        };
        let base = Url::parse(&origin).map_err(|e| HarvestError::location(&origin, e))?;
        if base.cannot_be_a_base() {
            return Err(HarvestError::location(&origin, "not usable as an API base"));
        }

        Ok(Self {
            http,
            base,
            tenant: location.tenant().to_string(),
            tokens,
        })
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `GET /v1/info`; empty on any failure
    pub async fn list_languages(&self) -> Fetched<Vec<String>> {
        let result = self.fetch_languages().await;
        if let Err(e) = &result {
            tracing::warn!("Error fetching languages: {}", e);
        }
        Fetched::from_result(result, Vec::new)
    }

    /// `GET /v1/translations/{language}`; empty document on any failure
    pub async fn get_translation(&self, language: &str) -> Fetched<TranslationDocument> {
        let result = self.fetch_translation(language).await;
        if let Err(e) = &result {
            tracing::warn!("Error fetching translation for {}: {}", language, e);
        }
        Fetched::from_result(result, TranslationDocument::new)
    }

    /// `POST /v1/organization/translations/{language}` with the whole document
    pub async fn put_translation(
        &self,
        language: &str,
        document: &TranslationDocument,
    ) -> Fetched<()> {
        let result = self.submit_translation(language, document).await;
        if let Err(e) = &result {
            tracing::warn!("Error updating translation for {}: {}", language, e);
        }
        Fetched::from_result(result, || ())
    }

    /// Fetches the current document, sets `key` to `value`, submits it back.
    ///
    /// Refuses to submit (returning the cause) when the current document could
    /// not be read, so a failed read never overwrites the remote document.
    pub async fn patch_key(
        &self,
        language: &str,
        key: &str,
        value: &str,
    ) -> Result<Fetched<()>, ClientError> {
        let mut document = self.get_translation(language).await.into_result()?;
        document.set(key, value);

        let submitted = self.put_translation(language, &document).await;
        if submitted.is_loaded() {
            tracing::info!("Updated translation for {} in {}: {}", key, language, value);
        }
        Ok(submitted)
    }

    async fn fetch_languages(&self) -> Result<Vec<String>, ClientError> {
        let url = self.endpoint(&["v1", "info"])?;
        let info: InfoResponse = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(info.languages.unwrap_or_default())
    }

    async fn fetch_translation(&self, language: &str) -> Result<TranslationDocument, ClientError> {
        let token = self.token()?;
        let url = self.endpoint(&["v1", "translations", language])?;
        let response: TranslationResponse = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(ACCEPT, "application/json")
            .header(TENANT_HEADER, &self.tenant)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response
            .translation
            .map(TranslationDocument::from_value)
            .unwrap_or_default())
    }

    async fn submit_translation(
        &self,
        language: &str,
        document: &TranslationDocument,
    ) -> Result<(), ClientError> {
        let token = self.token()?;
        let url = self.endpoint(&["v1", "organization", "translations", language])?;
        self.http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(ACCEPT, "application/json")
            .header(TENANT_HEADER, &self.tenant)
            .json(&TranslationBody {
                translation: document,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn token(&self) -> Result<String, ClientError> {
        self.tokens.access_token().ok_or(ClientError::MissingToken)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Endpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
