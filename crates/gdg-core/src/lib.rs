//! gdg-core: GDG WhatsApp Assistant Core Library
//!
//! Gemini API communication, the tool system, session management, and the
//! conversation orchestrator.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
pub mod tool;

pub use chat::{ChatOrchestrator, FALLBACK_REPLY, SYSTEM_PROMPT};
pub use config::{Config, GeminiConfig, GoogleConfig, ServerConfig, TwilioConfig};
pub use error::{Error, Result};
pub use llm::{ChatModel, Completion, Content, FunctionCall, FunctionDeclaration, GeminiClient};
pub use session::{Session, SessionStats, SessionStore};
pub use tool::{CalendarEvent, CalendarSource, Faq, SheetsSource, Speaker, ToolKind, ToolRegistry};
