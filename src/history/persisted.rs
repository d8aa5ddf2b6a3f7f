//! Persisted form of a history store
//!
//! Loading is lenient: local storage may hold data written by an older
//! widget, or data that was hand-edited or truncated. Anything missing or
//! malformed falls back to a default instead of discarding the whole history.

use super::{Turn, DEFAULT_CAPACITY};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Plain structured representation of a history store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PersistedHistory {
    pub turns: Vec<Turn>,
    pub capacity: usize,
    pub conversation_id: Option<String>,
}

impl Default for PersistedHistory {
    fn default() -> Self {
        Self {
            turns: Vec::new(),
            capacity: DEFAULT_CAPACITY.get(),
            conversation_id: None,
        }
    }
}

impl PersistedHistory {
    /// Build from an arbitrary JSON value, defaulting whatever is unusable
    ///
    /// Accepts both the current shape (`turns`, `capacity`, `conversationId`)
    /// and the legacy one (`messages`, `maxMessages`). Turn entries that fail
    /// to parse are skipped individually.
    pub fn from_value(value: &Value) -> Self {
        let turns = field(value, "turns", "messages")
            .and_then(Value::as_array)
            .map(|entries| parse_turns(entries))
            .unwrap_or_default();

        let capacity = field(value, "capacity", "maxMessages")
            .and_then(Value::as_u64)
            .and_then(|c| usize::try_from(c).ok())
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_CAPACITY.get());

        let conversation_id = field(value, "conversationId", "conversation_id")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Self {
            turns,
            capacity,
            conversation_id,
        }
    }
}

impl<'de> Deserialize<'de> for PersistedHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn field<'a>(value: &'a Value, name: &str, legacy: &str) -> Option<&'a Value> {
    value.get(name).or_else(|| value.get(legacy))
}

fn parse_turns(entries: &[Value]) -> Vec<Turn> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match Turn::deserialize(entry) {
            Ok(turn) => Some(turn),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed persisted turn");
                None
            }
        })
        .collect()
}
