//! Conversation controller
//!
//! Drives the exchange state machine against real collaborators: it feeds
//! events to the pure transition function and executes the effects it
//! returns. Effects that produce follow-up events (a chat request) are
//! processed in a loop, never recursively.

use crate::exchange::{transition, Effect, Event, ExchangeState, TransitionError};
use crate::history::{
    HistoryStore, PersistedHistory, Turn, TurnKind, DEFAULT_CONTEXT_LIMIT, DEFAULT_RELATED_WINDOW,
};
use crate::storage::{HistoryStorage, HISTORY_KEY};
use crate::surface::{ChatSurface, PendingIndicator};
use crate::transport::{ChatTransport, ContextEntry, SendRequest, TransportErrorKind};
use std::num::NonZeroUsize;

/// Shown when a session starts and after the conversation is cleared
pub const DEFAULT_GREETING: &str =
    "Hello! I'm JANE, your Job Assistance and Navigation Expert. How can I help you today?";

/// Shown when the server refuses to clear the conversation
pub const CLEAR_FAILED_MESSAGE: &str = "Failed to clear chat history";

/// History capacity used by the chat widget
pub const DEFAULT_WIDGET_CAPACITY: NonZeroUsize = match NonZeroUsize::new(20) {
    Some(capacity) => capacity,
    None => panic!("capacity must be non-zero"),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Turns kept in history
    pub capacity: NonZeroUsize,
    /// Turns sent as context with each request
    pub context_limit: usize,
    /// Presentation-only opening message; `None` shows nothing
    pub greeting: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_WIDGET_CAPACITY,
            context_limit: DEFAULT_CONTEXT_LIMIT,
            greeting: Some(DEFAULT_GREETING.to_string()),
        }
    }
}

/// How a submit, proceed or cancel call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Nothing to send
    Ignored,
    /// Not allowed in the current state; the UI was told why
    Rejected(TransitionError),
    /// The server wants the user to confirm before it acts
    AwaitingConfirmation { warning: String },
    /// Reply recorded
    Completed,
    /// Held message dropped
    Cancelled,
    /// Request failed; a warning turn was recorded
    Failed(TransportErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Failed,
}

fn load_history<S: HistoryStorage>(storage: &S, capacity: NonZeroUsize) -> HistoryStore {
    let raw = match storage.load(HISTORY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return HistoryStore::new(capacity),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load chat history, starting empty");
            return HistoryStore::new(capacity);
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => {
            let persisted = PersistedHistory::from_value(&value);
            let history = HistoryStore::from_persisted(PersistedHistory {
                capacity: capacity.get(),
                ..persisted
            });
            tracing::info!(turns = history.len(), "Restored chat history");
            history
        }
        Err(e) => {
            tracing::warn!(error = %e, "Stored chat history is not valid JSON, starting empty");
            HistoryStore::new(capacity)
        }
    }
}

/// One chat session: history, exchange state and the collaborators that
/// carry out effects
pub struct ConversationController<T, S, U>
where
    T: ChatTransport,
    S: HistoryStorage,
    U: ChatSurface,
{
    transport: T,
    storage: S,
    surface: U,
    history: HistoryStore,
    state: ExchangeState,
    config: ControllerConfig,
}

impl<T, S, U> ConversationController<T, S, U>
where
    T: ChatTransport,
    S: HistoryStorage,
    U: ChatSurface,
{
    /// Build a controller and restore the persisted history
    ///
    /// The configured capacity wins over the persisted one. Load failures
    /// are logged and the session starts empty. Nothing is rendered until
    /// [`start`](Self::start).
    pub fn new(transport: T, storage: S, surface: U, config: ControllerConfig) -> Self {
        let history = load_history(&storage, config.capacity);
        Self {
            transport,
            storage,
            surface,
            history,
            state: ExchangeState::Idle,
            config,
        }
    }

    /// Show the greeting followed by the restored turns, without scrolling
    pub fn start(&self) {
        self.show_greeting();
        for turn in self.history.turns(None) {
            self.surface
                .append_turn(turn.content(), turn.kind(), false, Some(turn.id()));
        }
    }

    /// Submit whatever is in the input field
    pub async fn submit(&mut self) -> ExchangeOutcome {
        let text = self.surface.input_text();
        self.submit_text(&text).await
    }

    /// Submit `raw`; blank text is ignored
    pub async fn submit_text(&mut self, raw: &str) -> ExchangeOutcome {
        let text = raw.trim();
        if text.is_empty() {
            return ExchangeOutcome::Ignored;
        }
        self.dispatch(Event::UserSubmit {
            text: text.to_string(),
        })
        .await
    }

    /// Re-send the held message with the confirmation flag set
    pub async fn proceed(&mut self) -> ExchangeOutcome {
        self.dispatch(Event::Proceed).await
    }

    /// Drop the held message without recording anything
    pub async fn cancel(&mut self) -> ExchangeOutcome {
        self.dispatch(Event::Cancel).await
    }

    /// Clear the conversation on the server, then locally
    ///
    /// Local state is only touched once the server has agreed.
    pub async fn clear_conversation(&mut self) -> ClearOutcome {
        if let Err(e) = self.transport.clear().await {
            tracing::warn!(error = %e, kind = ?e.kind, "Remote clear failed, keeping local history");
            self.surface.show_transient_error(CLEAR_FAILED_MESSAGE);
            return ClearOutcome::Failed;
        }

        self.history.clear();
        if let Err(e) = self.storage.remove(HISTORY_KEY) {
            tracing::warn!(error = %e, "Failed to remove stored chat history");
        }
        self.state = ExchangeState::Idle;
        self.surface.clear_transcript();
        self.show_greeting();
        ClearOutcome::Cleared
    }

    /// Rebind the history to a server conversation and persist
    pub fn set_conversation_id(&mut self, conversation_id: Option<String>) {
        self.history.set_conversation_id(conversation_id);
        self.persist();
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn state(&self) -> &ExchangeState {
        &self.state
    }

    /// Turns around `id` for highlighting
    pub fn related_turns(&self, id: &str) -> &[Turn] {
        self.history.related_turns(id, DEFAULT_RELATED_WINDOW)
    }

    // ==================== Event processing ====================

    async fn dispatch(&mut self, event: Event) -> ExchangeOutcome {
        match self.process_event(event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(error = %e, state = ?self.state, "Event rejected");
                self.surface.show_transient_error(&e.to_string());
                ExchangeOutcome::Rejected(e)
            }
        }
    }

    async fn process_event(&mut self, event: Event) -> Result<ExchangeOutcome, TransitionError> {
        let cancelled = matches!(event, Event::Cancel);
        let mut failure = None;
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            if let Event::TransportFailed { kind, .. } = &current_event {
                failure = Some(*kind);
            }

            // Pure state transition
            let result = transition(&self.state, current_event)?;
            self.state = result.new_state;

            // Execute effects and collect generated events
            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect).await {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(match &self.state {
            ExchangeState::AwaitingConfirmation { warning, .. } => {
                ExchangeOutcome::AwaitingConfirmation {
                    warning: warning.clone(),
                }
            }
            _ if cancelled => ExchangeOutcome::Cancelled,
            _ => failure.map_or(ExchangeOutcome::Completed, ExchangeOutcome::Failed),
        })
    }

    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::RecordTurn { kind, content } => {
                let turn = self.history.add_turn(content, kind, None);
                self.surface
                    .append_turn(turn.content(), turn.kind(), true, Some(turn.id()));
                None
            }

            Effect::PersistHistory => {
                self.persist();
                None
            }

            Effect::ClearInput => {
                self.surface.set_input_text("");
                None
            }

            Effect::SendChat { text, confirmed } => {
                let context: Vec<ContextEntry> = self
                    .history
                    .context_turns(self.config.context_limit)
                    .into_iter()
                    .map(ContextEntry::from)
                    .collect();
                let request = SendRequest::new(text, confirmed, context);

                let indicator = self.surface.show_pending_indicator();
                let result = self.transport.send(&request).await;
                indicator.dispose();

                Some(match result {
                    Ok(response) => Event::ResponseReceived { response },
                    Err(e) => Event::TransportFailed {
                        kind: e.kind,
                        message: e.message,
                    },
                })
            }

            Effect::PromptConfirmation { warning } => {
                self.surface.show_confirmation_prompt(&warning);
                None
            }
        }
    }

    /// Write the history to storage; failures are logged and swallowed
    fn persist(&self) {
        let json = match self.history.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize chat history");
                return;
            }
        };
        if let Err(e) = self.storage.save(HISTORY_KEY, &json) {
            tracing::warn!(error = %e, "Failed to save chat history");
        }
    }

    fn show_greeting(&self) {
        if let Some(greeting) = &self.config.greeting {
            self.surface
                .append_turn(greeting, TurnKind::Assistant, false, None);
        }
    }
}
