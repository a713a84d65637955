//! Presentation port.
//!
//! The engine never writes to the terminal directly; it hands [`Log`]
//! entries and questions to a [`Ui`]. Under auto-confirm the engine skips
//! its questions entirely instead of relying on the UI to answer them.

use crate::error::SyncError;

/// One block of user-facing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Log {
    Text(String),
    /// A titled list of lines.
    List { title: String, items: Vec<String> },
    Warning(String),
    /// Suggested next commands.
    Followup { title: String, items: Vec<String> },
}

impl Log {
    pub fn text(message: impl Into<String>) -> Self {
        Log::Text(message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Log::Warning(message.into())
    }

    pub fn list(title: impl Into<String>, items: Vec<String>) -> Self {
        Log::List {
            title: title.into(),
            items,
        }
    }

    pub fn suggested_commands(items: Vec<String>) -> Self {
        Log::Followup {
            title: "Try running instead".to_string(),
            items,
        }
    }
}

pub trait Ui {
    /// Non-interactive mode: every yes/no decision defaults to proceed.
    fn auto_confirm(&self) -> bool;

    fn print(&self, log: Log);

    fn confirm(&self, message: &str) -> Result<bool, SyncError>;

    fn input(&self, message: &str, default: Option<&str>) -> Result<String, SyncError>;

    /// Choose one of `options`; returns the chosen option verbatim.
    fn select(
        &self,
        message: &str,
        options: &[String],
        default: Option<&str>,
    ) -> Result<String, SyncError>;
}
