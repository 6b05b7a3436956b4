//! Conversation orchestration

mod orchestrator;

pub use orchestrator::{ChatOrchestrator, FALLBACK_REPLY, SYSTEM_PROMPT};
