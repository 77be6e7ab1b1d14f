//! Interactive mode flags

use serde::{Deserialize, Serialize};

/// Per-page-session mode flags; never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveState {
    /// Highlighting and click handlers are active
    pub interactive_mode_enabled: bool,
    /// Clicks open the popup instead of being swallowed
    pub editable: bool,
}
