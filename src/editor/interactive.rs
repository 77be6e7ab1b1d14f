//! Interactive mode: highlighting, click binding and the translation popup
//!
//! The editor never owns the DOM or the client; the page session lends both
//! for each call. Every operation runs to completion before the next one
//! starts, so the popup can only change across the network awaits inside
//! [`InteractiveEditor::select_language`] and [`InteractiveEditor::save`], and
//! those borrow the editor mutably for their whole duration.

use markup5ever_rcdom::{Handle, RcDom};

use super::popup::{Popup, PopupControl};
use super::state::InteractiveState;
use crate::config::constants::{HIGHLIGHT_BACKGROUND, HIGHLIGHT_CURSOR};
use crate::harvest::Extractor;
use crate::parsers::html::{
    get_parent_node, is_inclusive_descendant, remove_style_property, set_style_property,
};
use crate::remote::{ClientError, Fetched, TranslationClient};

/// A click delivered to the page
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub target: Handle,
    pub page_x: i32,
    pub page_y: i32,
}

impl ClickEvent {
    pub fn new(target: Handle, page_x: i32, page_y: i32) -> Self {
        Self {
            target,
            page_x,
            page_y,
        }
    }
}

/// What the handlers did with a click
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickResponse {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    /// Key shown in the popup, when the click opened it
    pub opened_key: Option<String>,
    /// Popup button the click landed on
    pub control: Option<PopupControl>,
}

/// Result of picking a language in the popup
#[derive(Debug)]
pub enum LanguageLoad {
    /// The popup is not showing
    NotOpen,
    /// The select does not offer this language
    UnknownLanguage,
    /// Document fetched; `value` is the key's current translation, if any
    Loaded { value: Option<String> },
    /// The fetch fell back; the input was cleared
    Degraded(ClientError),
    /// No access token; the popup was left as it was
    Refused(ClientError),
}

/// Result of pressing Save
#[derive(Debug)]
pub enum SaveOutcome {
    NotOpen,
    /// No language to save into
    NoLanguage,
    /// The current document could not be read; nothing was sent and the
    /// popup stays open
    Aborted(ClientError),
    /// The patched document was submitted and the popup hidden
    Submitted {
        key: String,
        language: String,
        result: Fetched<()>,
    },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(
            self,
            SaveOutcome::Submitted {
                result: Fetched::Loaded(()),
                ..
            }
        )
    }
}

#[derive(Debug, Default)]
pub struct InteractiveEditor {
    state: InteractiveState,
    bound: Vec<Handle>,
    popup: Option<Popup>,
}

impl InteractiveEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractiveState {
        self.state
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Whether `element` currently has the click handler
    pub fn is_bound(&self, element: &Handle) -> bool {
        self.bound.iter().any(|bound| Handle::ptr_eq(bound, element))
    }

    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    /// Enters interactive mode; returns whether the popup had to be injected
    pub async fn enable(
        &mut self,
        dom: &RcDom,
        extractor: &Extractor,
        client: &TranslationClient,
    ) -> bool {
        self.state.interactive_mode_enabled = true;
        self.refresh(dom, extractor, client).await
    }

    /// Leaves interactive mode, restoring every styled element
    pub fn disable(&mut self, dom: &RcDom, extractor: &Extractor) {
        self.state.interactive_mode_enabled = false;

        let matched = extractor.matched_elements(&dom.document);
        for element in self.bound.drain(..).chain(matched) {
            unhighlight(&element);
        }

        if let Some(popup) = &self.popup {
            popup.hide();
        }
        tracing::debug!("Interactive mode disabled");
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.state.editable = editable;
    }

    /// Brings styling, binding and the popup in line with the current document.
    ///
    /// A no-op while disabled. Returns whether the popup had to be injected.
    pub async fn refresh(
        &mut self,
        dom: &RcDom,
        extractor: &Extractor,
        client: &TranslationClient,
    ) -> bool {
        if !self.state.interactive_mode_enabled {
            return false;
        }

        self.reapply(dom, extractor);
        self.ensure_popup(dom, client).await
    }

    /// Styles and binds every matched element not bound yet
    pub fn reapply(&mut self, dom: &RcDom, extractor: &Extractor) {
        if !self.state.interactive_mode_enabled {
            return;
        }

        self.bound
            .retain(|element| is_inclusive_descendant(element, &dom.document));

        let mut newly_bound = 0;
        for element in extractor.matched_elements(&dom.document) {
            if self.is_bound(&element) {
                continue;
            }
            highlight(&element);
            self.bound.push(element);
            newly_bound += 1;
        }

        if newly_bound > 0 {
            tracing::debug!(
                "Bound {} element(s), {} in total",
                newly_bound,
                self.bound.len()
            );
        }
    }

    async fn ensure_popup(&mut self, dom: &RcDom, client: &TranslationClient) -> bool {
        if let Some(popup) = &self.popup {
            if popup.is_attached_to(&dom.document) {
                return false;
            }
        }

        if let Some(existing) = Popup::find(&dom.document) {
            self.popup = Some(existing);
            return false;
        }

        let languages = client.list_languages().await.into_value();
        match Popup::inject(dom, &languages) {
            Some(popup) => {
                tracing::debug!("Injected popup offering {} language(s)", languages.len());
                self.popup = Some(popup);
                true
            }
            None => {
                tracing::warn!("Document has no body; popup not injected");
                self.popup = None;
                false
            }
        }
    }

    /// Runs the click handlers for `event`
    pub fn click(
        &mut self,
        dom: &RcDom,
        extractor: &Extractor,
        event: &ClickEvent,
    ) -> ClickResponse {
        if let Some(control) = self
            .popup
            .as_ref()
            .and_then(|popup| popup.control_at(&event.target))
        {
            if control == PopupControl::Cancel {
                self.cancel();
            }
            return ClickResponse {
                control: Some(control),
                ..ClickResponse::default()
            };
        }

        if !self.state.interactive_mode_enabled {
            return ClickResponse::default();
        }

        let element = match self.bound_ancestor(&event.target) {
            Some(element) => element,
            None => return ClickResponse::default(),
        };

        if !self.state.editable {
            return ClickResponse {
                default_prevented: true,
                ..ClickResponse::default()
            };
        }

        let key = extractor.key_of(&element).unwrap_or_default();
        let opened_key = match &self.popup {
            Some(popup) => {
                popup.show(dom, &key, event.page_x, event.page_y);
                tracing::debug!("Opened popup for {:?}", key);
                Some(key)
            }
            None => {
                tracing::warn!("No popup to open for {:?}", key);
                None
            }
        };

        ClickResponse {
            default_prevented: true,
            propagation_stopped: true,
            opened_key,
            control: None,
        }
    }

    /// Loads the popup key's current translation in `language`
    pub async fn select_language(
        &mut self,
        dom: &RcDom,
        client: &TranslationClient,
        language: &str,
    ) -> LanguageLoad {
        let popup = match self.visible_popup() {
            Some(popup) => popup,
            None => return LanguageLoad::NotOpen,
        };
        if !popup.select_language(language) {
            return LanguageLoad::UnknownLanguage;
        }

        let key = popup.key();
        match client.get_translation(language).await {
            Fetched::Loaded(document) => {
                let value = document.lookup(&key).map(str::to_string);
                popup.set_input(dom, value.as_deref().unwrap_or_default());
                LanguageLoad::Loaded { value }
            }
            Fetched::Fallback { error, .. } if error.is_missing_token() => {
                LanguageLoad::Refused(error)
            }
            Fetched::Fallback { error, .. } => {
                popup.set_input(dom, "");
                LanguageLoad::Degraded(error)
            }
        }
    }

    /// Writes the popup's input to the key in the selected language
    pub async fn save(&mut self, client: &TranslationClient) -> SaveOutcome {
        let popup = match self.visible_popup() {
            Some(popup) => popup,
            None => return SaveOutcome::NotOpen,
        };
        let language = match popup.language() {
            Some(language) => language,
            None => return SaveOutcome::NoLanguage,
        };
        let key = popup.key();
        let value = popup.input();

        match client.patch_key(&language, &key, &value).await {
            Ok(result) => {
                popup.hide();
                SaveOutcome::Submitted {
                    key,
                    language,
                    result,
                }
            }
            Err(error) => {
                tracing::warn!("Not saving {:?}: {}", key, error);
                SaveOutcome::Aborted(error)
            }
        }
    }

    /// Hides the popup; in-flight requests are left alone
    pub fn cancel(&self) {
        if let Some(popup) = &self.popup {
            popup.hide();
        }
    }

    fn visible_popup(&self) -> Option<Popup> {
        self.popup.clone().filter(Popup::is_visible)
    }

    fn bound_ancestor(&self, target: &Handle) -> Option<Handle> {
        let mut current = Some(target.clone());
        while let Some(node) = current {
            if self.is_bound(&node) {
                return Some(node);
            }
            current = get_parent_node(&node);
        }
        None
    }
}

fn highlight(element: &Handle) {
    set_style_property(element, "background-color", HIGHLIGHT_BACKGROUND);
    set_style_property(element, "cursor", HIGHLIGHT_CURSOR);
}

fn unhighlight(element: &Handle) {
    remove_style_property(element, "background-color");
    remove_style_property(element, "cursor");
}
