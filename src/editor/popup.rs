//! The translation popup injected into the page
//!
//! The DOM is the popup's only state: the key lives in `#selected-key`, the
//! input in `#translation-input`, the language in the `selected` option and the
//! visibility in the root's inline `display`.

use markup5ever_rcdom::{Handle, RcDom};

use crate::parsers::html::{
    append_child, append_text, create_html_element, get_body, get_element_by_id, get_node_attr,
    get_style_property, is_inclusive_descendant, set_node_attr, set_style_property,
    set_text_content, text_content,
};

pub const POPUP_ID: &str = "translation-popup";
const KEY_ID: &str = "selected-key";
const LANGUAGE_ID: &str = "language-select";
const INPUT_ID: &str = "translation-input";
const SAVE_ID: &str = "save-translation";
const CANCEL_ID: &str = "cancel-translation";

const POPUP_STYLE: &str = "display: none; position: absolute; z-index: 1000; \
    background: white; border: 1px solid #ccc; padding: 15px; \
    box-shadow: 0px 4px 8px rgba(0,0,0,0.1);";

/// Handles to the popup's elements
#[derive(Debug, Clone)]
pub struct Popup {
    root: Handle,
    key: Handle,
    language: Handle,
    input: Handle,
    save: Handle,
    cancel: Handle,
}

/// Which popup control an element belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupControl {
    Save,
    Cancel,
}

impl Popup {
    /// Finds an already injected popup
    pub fn find(document: &Handle) -> Option<Self> {
        let root = get_element_by_id(document, POPUP_ID)?;
        Some(Self {
            key: get_element_by_id(&root, KEY_ID)?,
            language: get_element_by_id(&root, LANGUAGE_ID)?,
            input: get_element_by_id(&root, INPUT_ID)?,
            save: get_element_by_id(&root, SAVE_ID)?,
            cancel: get_element_by_id(&root, CANCEL_ID)?,
            root,
        })
    }

    /// Builds the hidden popup and appends it to `<body>`; `None` for documents
    /// without a body
    pub fn inject(dom: &RcDom, languages: &[String]) -> Option<Self> {
        let body = get_body(&dom.document)?;

        let container = create_html_element(dom, "div", &[]);
        let root = create_html_element(dom, "div", &[("id", POPUP_ID), ("style", POPUP_STYLE)]);
        append_child(dom, &container, &root);

        let heading = create_html_element(dom, "h3", &[]);
        append_text(dom, &heading, "Enter Translation");
        append_child(dom, &root, &heading);

        let key = create_html_element(dom, "p", &[("id", KEY_ID)]);
        append_child(dom, &root, &key);

        let language_label = create_html_element(dom, "label", &[("for", LANGUAGE_ID)]);
        append_text(dom, &language_label, "Select Language:");
        append_child(dom, &root, &language_label);

        let language = create_html_element(dom, "select", &[("id", LANGUAGE_ID)]);
        for (index, code) in languages.iter().enumerate() {
            let option = if index == 0 {
                create_html_element(dom, "option", &[("value", code), ("selected", "")])
            } else {
                create_html_element(dom, "option", &[("value", code)])
            };
            append_text(dom, &option, code);
            append_child(dom, &language, &option);
        }
        append_child(dom, &root, &language);

        let input_label = create_html_element(dom, "label", &[("for", INPUT_ID)]);
        append_text(dom, &input_label, "Translation:");
        append_child(dom, &root, &input_label);

        let input = create_html_element(
            dom,
            "textarea",
            &[
                ("id", INPUT_ID),
                ("rows", "4"),
                ("cols", "40"),
                ("placeholder", "Enter translation..."),
            ],
        );
        append_child(dom, &root, &input);

        let save = create_html_element(dom, "button", &[("id", SAVE_ID)]);
        append_text(dom, &save, "Save");
        append_child(dom, &root, &save);

        let cancel = create_html_element(dom, "button", &[("id", CANCEL_ID)]);
        append_text(dom, &cancel, "Cancel");
        append_child(dom, &root, &cancel);

        append_child(dom, &body, &container);

        Some(Self {
            root,
            key,
            language,
            input,
            save,
            cancel,
        })
    }

    pub fn root(&self) -> &Handle {
        &self.root
    }

    /// True while the popup is part of `document`
    pub fn is_attached_to(&self, document: &Handle) -> bool {
        is_inclusive_descendant(&self.root, document)
    }

    pub fn is_visible(&self) -> bool {
        get_style_property(&self.root, "display").as_deref() == Some("block")
    }

    /// Shows the popup at page coordinates with `key` and an empty input
    pub fn show(&self, dom: &RcDom, key: &str, x: i32, y: i32) {
        set_text_content(dom, &self.key, key);
        set_text_content(dom, &self.input, "");
        set_style_property(&self.root, "left", &format!("{}px", x));
        set_style_property(&self.root, "top", &format!("{}px", y));
        set_style_property(&self.root, "display", "block");
    }

    pub fn hide(&self) {
        set_style_property(&self.root, "display", "none");
    }

    pub fn key(&self) -> String {
        text_content(&self.key)
    }

    pub fn input(&self) -> String {
        text_content(&self.input)
    }

    pub fn set_input(&self, dom: &RcDom, value: &str) {
        set_text_content(dom, &self.input, value);
    }

    /// Every language offered by the select, in order
    pub fn languages(&self) -> Vec<String> {
        self.options()
            .iter()
            .filter_map(|option| get_node_attr(option, "value"))
            .collect()
    }

    /// Currently selected language, defaulting to the first option
    pub fn language(&self) -> Option<String> {
        let options = self.options();
        options
            .iter()
            .find(|option| get_node_attr(option, "selected").is_some())
            .or_else(|| options.first())
            .and_then(|option| get_node_attr(option, "value"))
    }

    /// Selects `language`; `false` when the select does not offer it
    pub fn select_language(&self, language: &str) -> bool {
        let options = self.options();
        if !options
            .iter()
            .any(|option| get_node_attr(option, "value").as_deref() == Some(language))
        {
            return false;
        }

        for option in options.iter() {
            let selected = get_node_attr(option, "value").as_deref() == Some(language);
            set_node_attr(option, "selected", selected.then(String::new));
        }
        true
    }

    /// Classifies a click target inside the popup
    pub fn control_at(&self, target: &Handle) -> Option<PopupControl> {
        if is_inclusive_descendant(target, &self.save) {
            Some(PopupControl::Save)
        } else if is_inclusive_descendant(target, &self.cancel) {
            Some(PopupControl::Cancel)
        } else {
            None
        }
    }

    fn options(&self) -> Vec<Handle> {
        self.language
            .children
            .borrow()
            .iter()
            .filter(|child| get_node_attr(child, "value").is_some())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::html_to_dom;

    fn languages() -> Vec<String> {
        vec!["en".to_string(), "fr".to_string()]
    }

    #[test]
    fn test_injected_popup_starts_hidden_and_is_findable() {
        let dom = html_to_dom(b"<html><body><p>x</p></body></html>", "utf-8");
        let popup = Popup::inject(&dom, &languages()).unwrap();

        assert!(!popup.is_visible());
        assert!(popup.is_attached_to(&dom.document));
        assert_eq!(popup.languages(), languages());
        assert_eq!(popup.language().as_deref(), Some("en"));

        let found = Popup::find(&dom.document).unwrap();
        assert!(Handle::ptr_eq(found.root(), popup.root()));
    }

    #[test]
    fn test_show_resets_input_and_positions() {
        let dom = html_to_dom(b"<html><body></body></html>", "utf-8");
        let popup = Popup::inject(&dom, &languages()).unwrap();
        popup.set_input(&dom, "stale");

        popup.show(&dom, "a.b", 10, 20);
        assert!(popup.is_visible());
        assert_eq!(popup.key(), "a.b");
        assert_eq!(popup.input(), "");
        assert_eq!(get_style_property(popup.root(), "left").as_deref(), Some("10px"));
        assert_eq!(get_style_property(popup.root(), "top").as_deref(), Some("20px"));

        popup.hide();
        assert!(!popup.is_visible());
    }

    #[test]
    fn test_language_selection() {
        let dom = html_to_dom(b"<html><body></body></html>", "utf-8");
        let popup = Popup::inject(&dom, &languages()).unwrap();

        assert!(popup.select_language("fr"));
        assert_eq!(popup.language().as_deref(), Some("fr"));
        assert!(!popup.select_language("de"));
        assert_eq!(popup.language().as_deref(), Some("fr"));
    }

    #[test]
    fn test_popup_without_languages() {
        let dom = html_to_dom(b"<html><body></body></html>", "utf-8");
        let popup = Popup::inject(&dom, &[]).unwrap();
        assert_eq!(popup.language(), None);
    }
}
