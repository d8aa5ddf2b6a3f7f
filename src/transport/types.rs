//! Wire types for the chat endpoint

use crate::history::{Turn, TurnKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Role label of a context entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ContextRole {
    User,
    Assistant,
}

impl From<TurnKind> for ContextRole {
    fn from(kind: TurnKind) -> Self {
        match kind {
            TurnKind::User => ContextRole::User,
            TurnKind::Assistant | TurnKind::Warning => ContextRole::Assistant,
        }
    }
}

/// One prior turn sent along with a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContextEntry {
    pub role: ContextRole,
    pub content: String,
}

impl From<&Turn> for ContextEntry {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.kind().into(),
            content: turn.content().to_string(),
        }
    }
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SendRequest {
    pub message: String,
    pub confirmed: bool,
    pub context: Vec<ContextEntry>,
    pub timestamp: DateTime<Utc>,
}

impl SendRequest {
    pub fn new(message: impl Into<String>, confirmed: bool, context: Vec<ContextEntry>) -> Self {
        Self {
            message: message.into(),
            confirmed,
            context,
            timestamp: Utc::now(),
        }
    }
}

/// Body returned by `POST /chat`
///
/// A missing `requiresConfirmation` means the action went ahead. `warning`
/// and `response` are independent; either, both or neither may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SendResponse {
    #[serde(default)]
    pub requires_confirmation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl SendResponse {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            warning: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn confirmation_required(warning: impl Into<String>) -> Self {
        Self {
            requires_confirmation: true,
            warning: Some(warning.into()),
            response: None,
        }
    }
}
