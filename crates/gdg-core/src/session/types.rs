//! Session types

use crate::llm::Content;

/// A single conversation session: an append-only turn history
#[derive(Debug, Clone)]
pub struct Session {
    pub turns: Vec<Content>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Default for Session {
    fn default() -> Self {
        let now = chrono::Utc::now();
        Self {
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Session {
    /// Append a turn to the history
    pub fn push_turn(&mut self, turn: Content) {
        self.turns.push(turn);
        self.updated_at = chrono::Utc::now();
    }
}

/// Store-level statistics
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub active_sessions: usize,
}
