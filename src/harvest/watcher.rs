//! Change watching
//!
//! [`ChangeWatcher`] coalesces mutation notifications into settle points: any
//! number of mutations between two settles produce exactly one re-extraction
//! pass. A new watcher starts pending, so the first settle doubles as the
//! startup pass.
//!
//! [`Poller`] is the substitute for hosts without mutation notification: it
//! re-reads a [`DocumentSource`] and reports a change only when the bytes differ
//! from the previous poll.

use super::extractor::Annotation;
use super::source::{DocumentSource, PageBytes};
use crate::error::HarvestResult;

/// Callback invoked with the annotations of every settled document
pub type SettledCallback = Box<dyn FnMut(&[Annotation])>;

pub struct ChangeWatcher {
    pending: bool,
    passes: u64,
    subscribers: Vec<SettledCallback>,
}

impl Default for ChangeWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeWatcher")
            .field("pending", &self.pending)
            .field("passes", &self.passes)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ChangeWatcher {
    pub fn new() -> Self {
        Self {
            pending: true,
            passes: 0,
            subscribers: Vec::new(),
        }
    }

    /// Registers a "document settled" callback
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&[Annotation]) + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Notes that the content subtree changed
    pub fn record_mutation(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Clears the pending flag, reporting whether a pass is due
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Delivers one pass's annotations to every subscriber
    pub fn notify(&mut self, annotations: &[Annotation]) {
        self.passes += 1;
        for subscriber in self.subscribers.iter_mut() {
            subscriber(annotations);
        }
    }

    /// Number of re-extraction passes run so far
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

/// Re-reads a source and reports changed content
#[derive(Debug)]
pub struct Poller {
    source: DocumentSource,
    http: reqwest::Client,
    fingerprint: Option<blake3::Hash>,
}

impl Poller {
    pub fn new(source: DocumentSource, http: reqwest::Client) -> Self {
        Self {
            source,
            http,
            fingerprint: None,
        }
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// `Some` when the document differs from the previous poll; the first poll
    /// always counts as a change
    pub async fn poll(&mut self) -> HarvestResult<Option<PageBytes>> {
        let page = self.source.load(&self.http).await?;
        let fingerprint = blake3::hash(&page.data);

        if self.fingerprint == Some(fingerprint) {
            tracing::trace!("{} unchanged", self.source);
            return Ok(None);
        }

        tracing::debug!("{} changed ({} bytes)", self.source, page.data.len());
        self.fingerprint = Some(fingerprint);
        Ok(Some(page))
    }
}
