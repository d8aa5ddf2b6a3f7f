//! Turn types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Opaque turn identifier, unique within one history store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct TurnId(String);

impl TurnId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TurnId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TurnId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// What produced a turn
///
/// The aliases accept the `type` values written by the first version of the
/// browser widget, so histories saved by it still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TurnKind {
    #[serde(alias = "user-message")]
    User,
    #[serde(alias = "bot-message")]
    Assistant,
    #[serde(alias = "warning-message")]
    Warning,
}

impl TurnKind {
    /// Whether turns of this kind are sent to the server as context
    pub fn is_context(self) -> bool {
        matches!(self, TurnKind::User | TurnKind::Assistant)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TurnKind::User => "user",
            TurnKind::Assistant => "assistant",
            TurnKind::Warning => "warning",
        }
    }
}

impl fmt::Display for TurnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded conversation entry
///
/// Turns are immutable: fields are only readable, and the store replaces
/// turns rather than editing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Turn {
    id: TurnId,
    content: String,
    #[serde(alias = "type")]
    kind: TurnKind,
    #[serde(default = "Utc::now", alias = "timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default, alias = "conversation_id")]
    conversation_id: Option<String>,
}

impl Turn {
    pub(crate) fn new(
        id: TurnId,
        content: String,
        kind: TurnKind,
        created_at: DateTime<Utc>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            id,
            content,
            kind,
            created_at,
            conversation_id,
        }
    }

    pub fn id(&self) -> &TurnId {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }
}
