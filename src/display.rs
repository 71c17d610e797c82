//! Display lines read back from the engine after each command.

use serde::Serialize;

/// The two display lines plus the error flag, captured at one moment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplaySnapshot {
    /// The operation in progress or just completed. Blank in error mode.
    pub history: String,
    /// The number being typed, the last result, or an error message.
    pub current: String,
    pub is_error: bool,
}

impl DisplaySnapshot {
    /// Text to put on the clipboard: the current line, error message included.
    pub fn text_for_clipboard(&self) -> &str {
        &self.current
    }

    /// Render as terminal lines, history first when requested and present.
    pub fn render_plain(&self, show_history: bool) -> String {
        if show_history && !self.history.is_empty() {
            format!("{}\n{}", self.history, self.current)
        } else {
            self.current.clone()
        }
    }
}
