//! In-memory session store
//!
//! The map itself is guarded by a `RwLock`; each session additionally sits
//! behind its own `Mutex` so that one request cycle holds the session for
//! its full duration. Concurrent messages from the same user serialize,
//! while different users proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::types::{Session, SessionStats};
use crate::llm::Content;

/// In-memory session store keyed by user identifier
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session for the given key, creating an empty one if absent
    pub async fn get_or_create(&self, key: &str) -> Arc<Mutex<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(key) {
                return Arc::clone(session);
            }
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Session::default()))),
        )
    }

    /// Remove the session for the given key; no-op if absent
    pub async fn clear(&self, key: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(key);
    }

    /// Current store statistics
    pub async fn stats(&self) -> SessionStats {
        let sessions = self.sessions.read().await;
        SessionStats {
            active_sessions: sessions.len(),
        }
    }

    /// Turn history for the given key; empty if no session exists
    pub async fn history(&self, key: &str) -> Vec<Content> {
        let session = {
            let sessions = self.sessions.read().await;
            sessions.get(key).cloned()
        };

        match session {
            Some(session) => session.lock().await.turns.clone(),
            None => Vec::new(),
        }
    }
}
