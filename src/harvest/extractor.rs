//! Annotation extraction
//!
//! Pure function of the current DOM: every element carrying the marker attribute
//! yields one (key, displayed value) pair, in document order.

use markup5ever_rcdom::Handle;
use serde::{Deserialize, Serialize};

use crate::config::constants;
use crate::parsers::html::{find_elements_with_attr, get_node_attr, get_node_name, text_content};

/// One element's translation binding, captured at extraction time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub key: String,
    pub value: String,
}

impl Annotation {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Scans documents for marker-tagged elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extractor {
    marker_attribute: String,
    no_visible_value: String,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(constants::DEFAULT_MARKER_ATTRIBUTE, constants::NO_VISIBLE_VALUE)
    }
}

impl Extractor {
    pub fn new(marker_attribute: impl Into<String>, no_visible_value: impl Into<String>) -> Self {
        Self {
            marker_attribute: marker_attribute.into(),
            no_visible_value: no_visible_value.into(),
        }
    }

    pub fn marker_attribute(&self) -> &str {
        &self.marker_attribute
    }

    /// Elements currently carrying the marker, in document order
    pub fn matched_elements(&self, document: &Handle) -> Vec<Handle> {
        find_elements_with_attr(document, &self.marker_attribute)
    }

    /// The element's key; empty markers yield an empty key
    pub fn key_of(&self, element: &Handle) -> Option<String> {
        get_node_attr(element, &self.marker_attribute)
    }

    /// Extracts every annotation; duplicates within the document are kept
    pub fn extract(&self, document: &Handle) -> Vec<Annotation> {
        self.matched_elements(document)
            .iter()
            .filter_map(|element| {
                let key = self.key_of(element)?;
                Some(Annotation {
                    key,
                    value: self.displayed_value(element),
                })
            })
            .collect()
    }

    /// Trimmed text, else the form value, else the sentinel
    pub fn displayed_value(&self, element: &Handle) -> String {
        let text = text_content(element);
        let text = text.trim();
        if !text.is_empty() {
            return text.to_string();
        }

        match form_value(element) {
            Some(value) if !value.is_empty() => value,
            _ => self.no_visible_value.clone(),
        }
    }
}

/// What `element.value` reports for form controls
fn form_value(element: &Handle) -> Option<String> {
    match get_node_name(element)? {
        "input" | "button" | "option" | "data" | "param" => get_node_attr(element, "value"),
        "textarea" => Some(text_content(element)),
        "select" => {
            let options = find_elements_with_attr(element, "value");
            options
                .iter()
                .find(|option| get_node_attr(option, "selected").is_some())
                .or_else(|| options.first())
                .and_then(|option| get_node_attr(option, "value"))
        }
        _ => None,
    }
}
