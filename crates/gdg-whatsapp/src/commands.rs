//! Reserved command handling
//!
//! A handful of message bodies are intercepted before the model sees them:
//! greetings, help, conversation reset, and a status check. Matching is
//! against the whole trimmed body, case-insensitively.

use chrono::{DateTime, Utc};

/// Welcome message sent for start/hello/hi
pub const WELCOME_TEXT: &str = "Hello there! 👋

Welcome to GDG Event Assistant! I'm here to help you with:

📅 Upcoming events and schedules
🎤 Speaker information and bios
❓ Frequently asked questions
📚 Community resources and materials
📊 Past event insights and feedback

Just ask me anything about our GDG community! For example:
• \"What events are coming up?\"
• \"Tell me about the speakers\"
• \"How do I join the community?\"
• \"What happened at the last event?\"

What would you like to know? 🚀";

/// Help message sent for help/menu/commands
pub const HELP_TEXT: &str = "Here's how I can help you! 🤖

📅 **Events**
• \"What events are coming up?\"
• \"When is the next workshop?\"
• \"Tell me about [event name]\"

🎤 **Speakers**
• \"Who is speaking at [event]?\"
• \"Tell me about [speaker name]\"
• \"What topics will be covered?\"

❓ **General Questions**
• \"How do I join GDG?\"
• \"Where are events held?\"
• \"What should I bring to events?\"

📚 **Resources**
• \"Show me learning materials\"
• \"What resources are available?\"
• \"How can I get involved?\"

Just type your question naturally - I'll understand! 😊";

/// Confirmation sent after a conversation reset
pub const RESET_TEXT: &str = "Conversation reset! How can I help you today? 🔄";

/// Reserved commands intercepted before the model is consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// start, hello, hi
    Start,
    /// help, menu, commands
    Help,
    /// reset, clear, restart
    Reset,
    /// status, health
    Status,
}

impl Command {
    /// Match a message body against the reserved commands.
    ///
    /// The whole body must equal a command word after trimming and
    /// lowercasing; "help me plan an event" is not a command.
    pub fn parse(body: &str) -> Option<Self> {
        match body.trim().to_lowercase().as_str() {
            "start" | "hello" | "hi" => Some(Command::Start),
            "help" | "menu" | "commands" => Some(Command::Help),
            "reset" | "clear" | "restart" => Some(Command::Reset),
            "status" | "health" => Some(Command::Status),
            _ => None,
        }
    }
}

/// Render the status reply
pub fn status_text(active_sessions: usize, now: DateTime<Utc>) -> String {
    format!(
        "🤖 GDG Bot Status:\n\n✅ Bot is running\n📊 Active sessions: {}\n🕐 Server time: {}",
        active_sessions,
        now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    )
}
