//! Exchange state types

/// Where the current user submission stands
///
/// The held text lives inside the states that need it, so confirming with
/// nothing held cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExchangeState {
    /// No outstanding submission, ready for input
    #[default]
    Idle,

    /// Request in flight for `held_text`
    AwaitingResponse { held_text: String, confirmed: bool },

    /// Server asked for explicit approval before acting on `held_text`
    AwaitingConfirmation { held_text: String, warning: String },
}

impl ExchangeState {
    /// The text of the outstanding submission, if any
    pub fn held_text(&self) -> Option<&str> {
        match self {
            ExchangeState::Idle => None,
            ExchangeState::AwaitingResponse { held_text, .. }
            | ExchangeState::AwaitingConfirmation { held_text, .. } => Some(held_text),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ExchangeState::Idle)
    }
}
