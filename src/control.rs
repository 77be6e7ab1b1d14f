//! Control surface protocol
//!
//! Messages exchanged between the control surface (the toolbar popup and the
//! keyboard shortcut) and a page session. The JSON shapes match the browser
//! extension wire format: `{"action": "...", ...}` in, plain objects out.

use serde::{Deserialize, Serialize};

use crate::error::HarvestResult;
use crate::store::{DomainRecord, Entry, MergeOutcome};

/// Keyboard command that toggles interactive mode on the active page
pub const TOGGLE_COMMAND: &str = "toggle-interactive-mode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlMessage {
    /// Annotations extracted by a page, to be merged into its domain record
    #[serde(rename = "save_i18n_data")]
    SaveI18nData { data: Vec<Entry> },
    EnableInteractiveMode,
    DisableInteractiveMode,
    ToggleInteractiveMode,
    GetInteractiveModeStatus,
    EnableEdit,
    DisableEdit,
    GetEditStatus,
    GetTabUrl,
}

impl ControlMessage {
    pub fn from_json(json: &str) -> HarvestResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> HarvestResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Reply to a [`ControlMessage`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlReply {
    InteractiveMode {
        #[serde(rename = "interactiveModeEnabled")]
        interactive_mode_enabled: bool,
    },
    Edit {
        editable: bool,
    },
    TabUrl {
        url: String,
    },
    Merged {
        appended: usize,
        total: usize,
    },
    /// Commands without a result
    Ack {},
}

impl ControlReply {
    pub fn ack() -> Self {
        ControlReply::Ack {}
    }

    pub fn to_json(&self) -> HarvestResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<MergeOutcome> for ControlReply {
    fn from(outcome: MergeOutcome) -> Self {
        ControlReply::Merged {
            appended: outcome.appended,
            total: outcome.total,
        }
    }
}

/// Message dispatched for a keyboard command, if the command is bound
pub fn command_message(command: &str) -> Option<ControlMessage> {
    (command == TOGGLE_COMMAND).then_some(ControlMessage::ToggleInteractiveMode)
}

/// The toolbar popup's listing of a domain record
pub fn render_summary(record: &DomainRecord) -> String {
    let mut lines = vec![format!("Total keys: {}", record.len())];

    if record.is_empty() {
        lines.push("No data-i18n attributes found.".to_string());
    } else {
        lines.extend(
            record
                .entries()
                .iter()
                .map(|entry| format!("\"{}\": \"{}\"", entry.key, entry.value)),
        );
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        let cases = [
            (r#"{"action":"enableInteractiveMode"}"#, ControlMessage::EnableInteractiveMode),
            (r#"{"action":"disableInteractiveMode"}"#, ControlMessage::DisableInteractiveMode),
            (r#"{"action":"toggleInteractiveMode"}"#, ControlMessage::ToggleInteractiveMode),
            (r#"{"action":"getInteractiveModeStatus"}"#, ControlMessage::GetInteractiveModeStatus),
            (r#"{"action":"enableEdit"}"#, ControlMessage::EnableEdit),
            (r#"{"action":"disableEdit"}"#, ControlMessage::DisableEdit),
            (r#"{"action":"getEditStatus"}"#, ControlMessage::GetEditStatus),
            (r#"{"action":"getTabUrl"}"#, ControlMessage::GetTabUrl),
        ];

        for (json, expected) in cases {
            assert_eq!(ControlMessage::from_json(json).unwrap(), expected);
        }
    }

    #[test]
    fn test_save_message_carries_entries() {
        let message = ControlMessage::from_json(
            r#"{"action":"save_i18n_data","data":[{"a.b":"Hello"},{"c":"World"}]}"#,
        )
        .unwrap();

        assert_eq!(
            message,
            ControlMessage::SaveI18nData {
                data: vec![Entry::new("a.b", "Hello"), Entry::new("c", "World")],
            }
        );
        assert_eq!(
            message.to_json().unwrap(),
            r#"{"action":"save_i18n_data","data":[{"a.b":"Hello"},{"c":"World"}]}"#
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(ControlMessage::from_json(r#"{"action":"getTabTitle"}"#).is_err());
    }

    #[test]
    fn test_reply_shapes() {
        let status = ControlReply::InteractiveMode {
            interactive_mode_enabled: true,
        };
        assert_eq!(status.to_json().unwrap(), r#"{"interactiveModeEnabled":true}"#);
        assert_eq!(
            ControlReply::Edit { editable: false }.to_json().unwrap(),
            r#"{"editable":false}"#
        );
        assert_eq!(ControlReply::ack().to_json().unwrap(), "{}");
    }

    #[test]
    fn test_keyboard_command() {
        assert_eq!(
            command_message("toggle-interactive-mode"),
            Some(ControlMessage::ToggleInteractiveMode)
        );
        assert_eq!(command_message("_execute_action"), None);
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            render_summary(&DomainRecord::new()),
            "Total keys: 0\nNo data-i18n attributes found."
        );

        let record: DomainRecord = vec![Entry::new("a.b", "Hello"), Entry::new("c", "World")]
            .into_iter()
            .collect();
        assert_eq!(
            render_summary(&record),
            "Total keys: 2\n\"a.b\": \"Hello\"\n\"c\": \"World\""
        );
    }
}
