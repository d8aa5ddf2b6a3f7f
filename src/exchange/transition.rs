//! Pure state transition function

use super::{Effect, Event, ExchangeState};
use crate::transport::SendResponse;
use thiserror::Error;

/// Prompt text used when the server asks for confirmation without a reason
pub const DEFAULT_CONFIRMATION_WARNING: &str =
    "This message may need a second look. Send it anyway?";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ExchangeState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ExchangeState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A message is already being sent")]
    Busy,
    #[error("Confirm or cancel the pending message first")]
    ConfirmationPending,
    #[error("There is no message waiting for confirmation")]
    NothingToConfirm,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Treat empty strings the same as a missing field
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs. All I/O is
/// described by the returned effects.
pub fn transition(
    state: &ExchangeState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Submission
        // ============================================================

        (ExchangeState::Idle, Event::UserSubmit { text }) => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            Ok(TransitionResult::new(ExchangeState::AwaitingResponse {
                held_text: text.clone(),
                confirmed: false,
            })
            .with_effect(Effect::record_user(text.clone()))
            .with_effect(Effect::PersistHistory)
            .with_effect(Effect::ClearInput)
            .with_effect(Effect::SendChat {
                text,
                confirmed: false,
            }))
        }

        (ExchangeState::AwaitingResponse { .. }, Event::UserSubmit { .. }) => {
            Err(TransitionError::Busy)
        }

        (ExchangeState::AwaitingConfirmation { .. }, Event::UserSubmit { .. }) => {
            Err(TransitionError::ConfirmationPending)
        }

        // ============================================================
        // Server replies
        // ============================================================

        (
            ExchangeState::AwaitingResponse {
                held_text,
                confirmed,
            },
            Event::ResponseReceived { response },
        ) => Ok(handle_response(held_text, *confirmed, response)),

        (ExchangeState::AwaitingResponse { .. }, Event::TransportFailed { kind, .. }) => {
            Ok(TransitionResult::new(ExchangeState::Idle)
                .with_effect(Effect::record_warning(kind.user_message()))
                .with_effect(Effect::PersistHistory))
        }

        (_, Event::ResponseReceived { .. }) => Err(TransitionError::InvalidTransition(
            "response received with no request in flight".to_string(),
        )),

        (_, Event::TransportFailed { .. }) => Err(TransitionError::InvalidTransition(
            "transport failure with no request in flight".to_string(),
        )),

        // ============================================================
        // Confirmation
        // ============================================================

        (ExchangeState::AwaitingConfirmation { held_text, .. }, Event::Proceed) => {
            Ok(TransitionResult::new(ExchangeState::AwaitingResponse {
                held_text: held_text.clone(),
                confirmed: true,
            })
            .with_effect(Effect::SendChat {
                text: held_text.clone(),
                confirmed: true,
            }))
        }

        (ExchangeState::AwaitingConfirmation { .. }, Event::Cancel) => {
            Ok(TransitionResult::new(ExchangeState::Idle).with_effect(Effect::ClearInput))
        }

        (_, Event::Proceed | Event::Cancel) => Err(TransitionError::NothingToConfirm),
    }
}

fn handle_response(held_text: &str, confirmed: bool, response: SendResponse) -> TransitionResult {
    let warning = non_empty(response.warning);

    // A confirmed request is never bounced back for confirmation again
    if response.requires_confirmation && !confirmed {
        let warning = warning.unwrap_or_else(|| DEFAULT_CONFIRMATION_WARNING.to_string());
        return TransitionResult::new(ExchangeState::AwaitingConfirmation {
            held_text: held_text.to_string(),
            warning: warning.clone(),
        })
        .with_effect(Effect::PromptConfirmation { warning });
    }

    let recorded = warning
        .map(Effect::record_warning)
        .into_iter()
        .chain(non_empty(response.response).map(Effect::record_assistant));

    TransitionResult::new(ExchangeState::Idle)
        .with_effects(recorded)
        .with_effect(Effect::PersistHistory)
}
