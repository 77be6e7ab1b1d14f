//! # Interactive editor
//!
//! - `state` - the per-session mode flags
//! - `popup` - the injected translation popup
//! - `interactive` - enable/disable, click dispatch, language selection, save

pub mod interactive;
pub mod popup;
pub mod state;

pub use interactive::{ClickEvent, ClickResponse, InteractiveEditor, LanguageLoad, SaveOutcome};
pub use popup::{Popup, PopupControl, POPUP_ID};
pub use state::InteractiveState;
