//! Page sessions
//!
//! A [`PageSession`] is everything one open page owns: its DOM, its location,
//! the interactive mode flags and the change watcher. The domain store and the
//! translation client are shared handles passed in by the host.
//!
//! Sessions are single-threaded. Handlers run one at a time and only
//! interleave at the network awaits of the editor and the control messages.

use markup5ever_rcdom::{Handle, RcDom};

use crate::control::{command_message, ControlMessage, ControlReply};
use crate::editor::{
    ClickEvent, ClickResponse, InteractiveEditor, InteractiveState, LanguageLoad, PopupControl,
    SaveOutcome,
};
use crate::error::HarvestResult;
use crate::harvest::{Annotation, ChangeWatcher, Extractor};
use crate::parsers::html::{get_element_by_id, serialize_document};
use crate::remote::{Fetched, TranslationClient};
use crate::store::{DomainStore, MergeOutcome};
use crate::utils::PageLocation;

pub struct PageSession {
    location: PageLocation,
    dom: RcDom,
    extractor: Extractor,
    watcher: ChangeWatcher,
    editor: InteractiveEditor,
    store: DomainStore,
    client: TranslationClient,
}

impl std::fmt::Debug for PageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSession")
            .field("location", &self.location)
            .field("extractor", &self.extractor)
            .field("watcher", &self.watcher)
            .field("state", &self.editor.state())
            .finish_non_exhaustive()
    }
}

impl PageSession {
    /// Opens a session on an already parsed document; nothing is extracted
    /// until the first [`settle`](Self::settle)
    pub fn new(
        location: PageLocation,
        dom: RcDom,
        extractor: Extractor,
        store: DomainStore,
        client: TranslationClient,
    ) -> Self {
        tracing::debug!("Opening page session for {}", location.url());
        Self {
            location,
            dom,
            extractor,
            watcher: ChangeWatcher::new(),
            editor: InteractiveEditor::new(),
            store,
            client,
        }
    }

    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    pub fn domain(&self) -> &str {
        self.location.domain()
    }

    pub fn dom(&self) -> &RcDom {
        &self.dom
    }

    pub fn document(&self) -> &Handle {
        &self.dom.document
    }

    pub fn element_by_id(&self, id: &str) -> Option<Handle> {
        get_element_by_id(&self.dom.document, id)
    }

    pub fn store(&self) -> &DomainStore {
        &self.store
    }

    pub fn client(&self) -> &TranslationClient {
        &self.client
    }

    pub fn editor(&self) -> &InteractiveEditor {
        &self.editor
    }

    pub fn state(&self) -> InteractiveState {
        self.editor.state()
    }

    pub fn watcher(&self) -> &ChangeWatcher {
        &self.watcher
    }

    /// Registers a "document settled" callback
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&[Annotation]) + 'static,
    {
        self.watcher.subscribe(callback);
    }

    pub fn record_mutation(&mut self) {
        self.watcher.record_mutation();
    }

    /// Edits the document and records the change
    pub fn mutate<F, R>(&mut self, edit: F) -> R
    where
        F: FnOnce(&RcDom) -> R,
    {
        let result = edit(&self.dom);
        self.watcher.record_mutation();
        result
    }

    /// Swaps in a freshly loaded document, as when a polled source changed
    pub fn replace_document(&mut self, dom: RcDom) {
        self.dom = dom;
        self.watcher.record_mutation();
    }

    /// Runs one re-extraction pass if the document changed since the last one.
    ///
    /// Merges the annotations into the domain record, notifies subscribers and,
    /// in interactive mode, binds newly matched elements. Returns `None` when
    /// nothing was pending. A storage failure is logged and returned after the
    /// rest of the pass has run.
    pub async fn settle(&mut self) -> HarvestResult<Option<MergeOutcome>> {
        if !self.watcher.take_pending() {
            return Ok(None);
        }

        let annotations = self.extractor.extract(&self.dom.document);
        let merged = self
            .store
            .merge(self.location.domain(), annotations.iter().cloned());
        if let Err(e) = &merged {
            tracing::warn!(
                "Failed to record keys for {}: {}",
                self.location.domain(),
                e
            );
        }

        self.watcher.notify(&annotations);

        if self
            .editor
            .refresh(&self.dom, &self.extractor, &self.client)
            .await
        {
            self.watcher.record_mutation();
        }

        merged.map(Some)
    }

    pub async fn enable_interactive_mode(&mut self) {
        if self
            .editor
            .enable(&self.dom, &self.extractor, &self.client)
            .await
        {
            self.watcher.record_mutation();
        }
        tracing::info!("Interactive mode enabled on {}", self.location.domain());
    }

    pub fn disable_interactive_mode(&mut self) {
        self.editor.disable(&self.dom, &self.extractor);
        tracing::info!("Interactive mode disabled on {}", self.location.domain());
    }

    /// Flips interactive mode, returning the new value
    pub async fn toggle_interactive_mode(&mut self) -> bool {
        if self.state().interactive_mode_enabled {
            self.disable_interactive_mode();
        } else {
            self.enable_interactive_mode().await;
        }
        self.state().interactive_mode_enabled
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editor.set_editable(editable);
        tracing::debug!("Editing {}", if editable { "enabled" } else { "disabled" });
    }

    /// Dispatches a click; a click on the popup's Save button also saves
    pub async fn click(&mut self, event: &ClickEvent) -> ClickResponse {
        let response = self.editor.click(&self.dom, &self.extractor, event);
        if response.control == Some(PopupControl::Save) {
            self.save().await;
        }
        response
    }

    pub async fn select_language(&mut self, language: &str) -> LanguageLoad {
        self.editor
            .select_language(&self.dom, &self.client, language)
            .await
    }

    pub async fn save(&mut self) -> SaveOutcome {
        let outcome = self.editor.save(&self.client).await;
        if let SaveOutcome::Submitted {
            key,
            language,
            result: Fetched::Loaded(()),
        } = &outcome
        {
            tracing::info!("Saved {} translation for {}", language, key);
        }
        outcome
    }

    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    /// Answers a control surface message
    pub async fn handle_message(
        &mut self,
        message: ControlMessage,
    ) -> HarvestResult<ControlReply> {
        tracing::debug!("Control message: {:?}", message);

        let reply = match message {
            ControlMessage::SaveI18nData { data } => {
                self.store.merge(self.location.domain(), data)?.into()
            }
            ControlMessage::EnableInteractiveMode => {
                self.enable_interactive_mode().await;
                ControlReply::ack()
            }
            ControlMessage::DisableInteractiveMode => {
                self.disable_interactive_mode();
                ControlReply::ack()
            }
            ControlMessage::ToggleInteractiveMode => {
                self.toggle_interactive_mode().await;
                ControlReply::ack()
            }
            ControlMessage::GetInteractiveModeStatus => ControlReply::InteractiveMode {
                interactive_mode_enabled: self.state().interactive_mode_enabled,
            },
            ControlMessage::EnableEdit => {
                self.set_editable(true);
                ControlReply::ack()
            }
            ControlMessage::DisableEdit => {
                self.set_editable(false);
                ControlReply::ack()
            }
            ControlMessage::GetEditStatus => ControlReply::Edit {
                editable: self.state().editable,
            },
            ControlMessage::GetTabUrl => ControlReply::TabUrl {
                url: self.location.url().to_string(),
            },
        };

        Ok(reply)
    }

    /// Runs a keyboard command; unbound commands are ignored
    pub async fn handle_command(&mut self, command: &str) -> HarvestResult<Option<ControlReply>> {
        match command_message(command) {
            Some(message) => self.handle_message(message).await.map(Some),
            None => {
                tracing::debug!("Ignoring unbound command {}", command);
                Ok(None)
            }
        }
    }

    /// The current document as HTML
    pub fn serialize(&self, encoding: &str) -> HarvestResult<Vec<u8>> {
        Ok(serialize_document(&self.dom.document, encoding)?)
    }
}
