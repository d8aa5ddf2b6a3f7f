//! Effects produced by state transitions

use crate::history::TurnKind;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a turn to the history and render it
    RecordTurn { kind: TurnKind, content: String },

    /// Write the history to local storage
    PersistHistory,

    /// Empty the input field
    ClearInput,

    /// Issue one chat request; its outcome comes back as an event
    SendChat { text: String, confirmed: bool },

    /// Show the proceed/cancel prompt
    PromptConfirmation { warning: String },
}

impl Effect {
    pub fn record_user(content: impl Into<String>) -> Self {
        Effect::RecordTurn {
            kind: TurnKind::User,
            content: content.into(),
        }
    }

    pub fn record_assistant(content: impl Into<String>) -> Self {
        Effect::RecordTurn {
            kind: TurnKind::Assistant,
            content: content.into(),
        }
    }

    pub fn record_warning(content: impl Into<String>) -> Self {
        Effect::RecordTurn {
            kind: TurnKind::Warning,
            content: content.into(),
        }
    }
}
