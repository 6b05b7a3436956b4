//! gdg-whatsapp: WhatsApp integration for the GDG Event Assistant via Twilio
//!
//! This crate provides the Twilio WhatsApp client, the reserved command
//! dispatcher, and the axum webhook server that ties them to the chat
//! orchestrator in gdg-core.

pub mod commands;
pub mod error;
pub mod twilio;
pub mod webhook;

pub use commands::{Command, HELP_TEXT, RESET_TEXT, WELCOME_TEXT};
pub use error::{Result, WhatsAppError};
pub use twilio::{IncomingMessage, TwilioClient, strip_channel_prefix};
pub use webhook::{WebhookServer, WebhookState};
