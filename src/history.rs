//! Bounded conversation history
//!
//! An ordered, size-bounded log of turns. Once the store is full the oldest
//! turns are evicted first. Every turn carries an id that is unique for the
//! lifetime of the store, so UI elements can be correlated back to it even
//! after the turn itself has been evicted.

mod id;
mod persisted;
mod turn;

#[cfg(test)]
mod proptests;

pub use persisted::PersistedHistory;
pub use turn::{Turn, TurnId, TurnKind};

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::num::NonZeroUsize;

/// Capacity used when none is given or the persisted one is unusable
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(capacity) => capacity,
    None => panic!("default capacity must be non-zero"),
};

/// Number of context turns sent with a request unless configured otherwise
pub const DEFAULT_CONTEXT_LIMIT: usize = 5;

/// Turns on each side of the target returned by `related_turns`
pub const DEFAULT_RELATED_WINDOW: usize = 2;

/// Ordered, size-bounded, id-indexed log of turns
#[derive(Debug, Clone)]
pub struct HistoryStore {
    turns: Vec<Turn>,
    capacity: NonZeroUsize,
    conversation_id: Option<String>,
    /// Ids of the turns currently held
    live_ids: HashSet<TurnId>,
    /// Sequence number embedded in the next generated id
    next_seq: u64,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            // Capacity may come from untrusted input, so nothing is reserved
            turns: Vec::new(),
            capacity,
            conversation_id: None,
            live_ids: HashSet::new(),
            next_seq: 0,
        }
    }

    /// Append a new turn, evicting the oldest ones past capacity
    ///
    /// The turn is stamped with the store's current conversation id. Returns
    /// a copy of the stored turn so callers can correlate UI elements by id.
    pub fn add_turn(
        &mut self,
        content: impl Into<String>,
        kind: TurnKind,
        created_at: Option<DateTime<Utc>>,
    ) -> Turn {
        let turn = Turn::new(
            self.fresh_id(),
            content.into(),
            kind,
            created_at.unwrap_or_else(Utc::now),
            self.conversation_id.clone(),
        );
        self.turns.push(turn.clone());
        self.evict_overflow();
        turn
    }

    /// All turns, or only the last `limit`, oldest first
    pub fn turns(&self, limit: Option<usize>) -> &[Turn] {
        match limit {
            Some(limit) => &self.turns[self.turns.len().saturating_sub(limit)..],
            None => &self.turns,
        }
    }

    /// The last `limit` user/assistant turns, oldest first
    ///
    /// Warnings are skipped and never count toward `limit`.
    pub fn context_turns(&self, limit: usize) -> Vec<&Turn> {
        let mut recent: Vec<&Turn> = self
            .turns
            .iter()
            .rev()
            .filter(|turn| turn.kind().is_context())
            .take(limit)
            .collect();
        recent.reverse();
        recent
    }

    pub fn turn_by_id(&self, id: &str) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.id().as_str() == id)
    }

    /// Turns within `window` positions of `id`, clipped to the store bounds
    ///
    /// Returns an empty slice when `id` is unknown (e.g. already evicted).
    pub fn related_turns(&self, id: &str, window: usize) -> &[Turn] {
        let Some(index) = self.turns.iter().position(|turn| turn.id().as_str() == id) else {
            return &[];
        };
        let start = index.saturating_sub(window);
        let end = index
            .saturating_add(window)
            .saturating_add(1)
            .min(self.turns.len());
        &self.turns[start..end]
    }

    /// Drop all turns; capacity and conversation id are kept
    pub fn clear(&mut self) {
        self.turns.clear();
        self.live_ids.clear();
    }

    pub fn set_conversation_id(&mut self, conversation_id: Option<String>) {
        self.conversation_id = conversation_id;
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    // ==================== Persistence ====================

    pub fn to_persisted(&self) -> PersistedHistory {
        PersistedHistory {
            turns: self.turns.clone(),
            capacity: self.capacity.get(),
            conversation_id: self.conversation_id.clone(),
        }
    }

    /// Rebuild a store from its persisted form
    ///
    /// Duplicate ids keep their first occurrence, and a history longer than
    /// its capacity keeps only the newest turns.
    pub fn from_persisted(persisted: PersistedHistory) -> Self {
        let capacity = NonZeroUsize::new(persisted.capacity).unwrap_or(DEFAULT_CAPACITY);
        let mut store = Self::new(capacity);
        store.conversation_id = persisted.conversation_id;

        for turn in persisted.turns {
            if store.live_ids.insert(turn.id().clone()) {
                store.turns.push(turn);
            } else {
                tracing::warn!(id = %turn.id(), "Dropping persisted turn with duplicate id");
            }
        }
        store.evict_overflow();
        store
    }

    /// Serialize to the JSON string kept in local storage
    ///
    /// # Errors
    ///
    /// Only fails if `serde_json` cannot serialize the turns, which does not
    /// happen for well-formed UTF-8 content.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_persisted())
    }

    /// Parse a store from its JSON string
    ///
    /// # Errors
    ///
    /// Returns an error only when `json` is not valid JSON at all. Valid JSON
    /// with missing or malformed fields loads with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        Self::from_persisted(PersistedHistory::from_value(value))
    }

    // ==================== Internals ====================

    /// Ids carry a per-store sequence number, so ids generated by one store
    /// never repeat. The live set only guards against loaded turns.
    fn fresh_id(&mut self) -> TurnId {
        loop {
            let id = id::generate_turn_id(self.next_seq);
            self.next_seq = self.next_seq.wrapping_add(1);
            if self.live_ids.insert(id.clone()) {
                return id;
            }
            tracing::warn!(id = %id, "Turn id collision, regenerating");
        }
    }

    fn evict_overflow(&mut self) {
        let excess = self.turns.len().saturating_sub(self.capacity.get());
        if excess > 0 {
            for turn in self.turns.drain(..excess) {
                self.live_ids.remove(turn.id());
            }
            tracing::debug!(evicted = excess, "Evicted oldest turns");
        }
    }
}
