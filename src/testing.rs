//! Mock implementations for testing
//!
//! These mocks let the controller run end to end without a network, a disk
//! or a terminal.

use crate::history::{TurnId, TurnKind};
use crate::storage::{HistoryStorage, StorageError, StorageResult};
use crate::surface::{ChatSurface, PendingIndicator};
use crate::transport::{ChatTransport, SendRequest, SendResponse, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport that returns queued results and records what it was sent
#[derive(Default)]
pub struct MockTransport {
    send_results: Mutex<VecDeque<Result<SendResponse, TransportError>>>,
    clear_results: Mutex<VecDeque<Result<(), TransportError>>>,
    requests: Mutex<Vec<SendRequest>>,
    clear_calls: Mutex<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_response(&self, response: SendResponse) {
        self.send_results.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_error(&self, error: TransportError) {
        self.send_results.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_clear(&self, result: Result<(), TransportError>) {
        self.clear_results.lock().unwrap().push_back(result);
    }

    pub fn recorded_requests(&self) -> Vec<SendRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) -> usize {
        *self.clear_calls.lock().unwrap()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(&self, request: &SendRequest) -> Result<SendResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.send_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock response queued")))
    }

    async fn clear(&self) -> Result<(), TransportError> {
        *self.clear_calls.lock().unwrap() += 1;
        self.clear_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

// ============================================================================
// Recording Surface
// ============================================================================

/// Everything the controller asked the UI to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Turn {
        content: String,
        kind: TurnKind,
        scroll_into_view: bool,
        id: Option<TurnId>,
    },
    IndicatorShown,
    IndicatorDisposed,
    ConfirmationPrompt(String),
    TransientError(String),
    InputSet(String),
    TranscriptCleared,
}

type CallLog = Arc<Mutex<Vec<SurfaceCall>>>;

/// Surface that logs every call and holds an input buffer
#[derive(Default)]
pub struct RecordingSurface {
    calls: CallLog,
    input: Mutex<String>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_input(&self, text: &str) {
        *self.input.lock().unwrap() = text.to_string();
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Rendered turns as (kind, content), in order
    pub fn rendered_turns(&self) -> Vec<(TurnKind, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Turn { content, kind, .. } => Some((kind, content)),
                _ => None,
            })
            .collect()
    }

    pub fn transient_errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::TransientError(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct RecordingIndicator {
    calls: CallLog,
}

impl PendingIndicator for RecordingIndicator {
    fn dispose(self) {
        self.calls.lock().unwrap().push(SurfaceCall::IndicatorDisposed);
    }
}

impl ChatSurface for RecordingSurface {
    type Indicator = RecordingIndicator;

    fn append_turn(&self, content: &str, kind: TurnKind, scroll_into_view: bool, id: Option<&TurnId>) {
        self.record(SurfaceCall::Turn {
            content: content.to_string(),
            kind,
            scroll_into_view,
            id: id.cloned(),
        });
    }

    fn show_pending_indicator(&self) -> RecordingIndicator {
        self.record(SurfaceCall::IndicatorShown);
        RecordingIndicator {
            calls: Arc::clone(&self.calls),
        }
    }

    fn show_confirmation_prompt(&self, warning: &str) {
        self.record(SurfaceCall::ConfirmationPrompt(warning.to_string()));
    }

    fn show_transient_error(&self, message: &str) {
        self.record(SurfaceCall::TransientError(message.to_string()));
    }

    fn input_text(&self) -> String {
        self.input.lock().unwrap().clone()
    }

    fn set_input_text(&self, text: &str) {
        self.type_input(text);
        self.record(SurfaceCall::InputSet(text.to_string()));
    }

    fn clear_transcript(&self) {
        self.record(SurfaceCall::TranscriptCleared);
    }
}

// ============================================================================
// Failing Storage
// ============================================================================

/// Storage whose writes always fail
#[derive(Default)]
pub struct FailingStorage {
    pub save_attempts: Mutex<usize>,
}

impl FailingStorage {
    fn failure() -> StorageError {
        StorageError::Io {
            path: PathBuf::from("/unwritable/chat_history.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "quota exceeded"),
        }
    }
}

impl HistoryStorage for FailingStorage {
    fn load(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(Self::failure())
    }

    fn save(&self, _key: &str, _payload: &str) -> StorageResult<()> {
        *self.save_attempts.lock().unwrap() += 1;
        Err(Self::failure())
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(Self::failure())
    }
}
