//! gdg-gateway: GDG Event Assistant Main Binary
//!
//! Main entry point for the GDG WhatsApp event assistant.
//!
//! Usage:
//!   gdg-gateway           - Start the webhook server
//!   gdg-gateway --help    - Show help

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use gdg_core::chat::{ChatOrchestrator, SYSTEM_PROMPT};
use gdg_core::config::Config;
use gdg_core::llm::GeminiClient;
use gdg_core::session::SessionStore;
use gdg_core::tool::ToolRegistry;
use gdg_google::{CalendarClient, SheetsClient};
use gdg_whatsapp::{TwilioClient, WebhookServer};

/// Run mode
enum RunMode {
    /// Webhook server mode
    Server,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args();

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("gdg-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration (gdg-gateway.toml + environment overrides)
    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting gdg-gateway...");
    tracing::info!("Model: {}", config.gemini.model);

    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("gdg-gateway - GDG Event Assistant WhatsApp Bot");
    println!();
    println!("Usage:");
    println!("  gdg-gateway           Start the webhook server");
    println!("  gdg-gateway --help    Show this help message");
    println!("  gdg-gateway --version Show version");
    println!();
    println!("Environment Variables:");
    println!("  GEMINI_API_KEY        Gemini API key (required)");
    println!("  GEMINI_MODEL          Model name (default: gemini-2.5-flash)");
    println!("  GEMINI_BASE_URL       Custom Gemini API endpoint");
    println!("  TWILIO_ACCOUNT_SID    Twilio account SID");
    println!("  TWILIO_AUTH_TOKEN     Twilio auth token");
    println!("  TWILIO_PHONE_NUMBER   WhatsApp sender number");
    println!("  GOOGLE_API_KEY        Google API key for Calendar and Sheets");
    println!("  GOOGLE_CALENDAR_ID    Calendar to read events from");
    println!("  GOOGLE_SHEET_ID       Spreadsheet with FAQs and speakers");
    println!("  PORT                  Webhook server port (default: 3000)");
}

/// Run the webhook server
async fn run_server(config: Config) -> anyhow::Result<()> {
    // Gemini client with the assistant persona
    let model = GeminiClient::new(&config.gemini)
        .map_err(|e| anyhow::anyhow!("Failed to create Gemini client: {}", e))?
        .with_system_instruction(SYSTEM_PROMPT);

    // Read-only Google data sources backing the tool calls
    let calendar = CalendarClient::new(&config.google);
    let sheets = SheetsClient::new(&config.google);
    let tools = ToolRegistry::new(Arc::new(calendar), Arc::new(sheets));

    let sessions = Arc::new(SessionStore::new());
    let orchestrator = Arc::new(ChatOrchestrator::new(Arc::new(model), tools, sessions));

    let twilio = Arc::new(TwilioClient::new(
        config.twilio.account_sid.clone(),
        config.twilio.auth_token.clone(),
        config.twilio.phone_number.clone(),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let server = WebhookServer::new(addr, twilio, orchestrator);

    let handle = tokio::spawn(async move {
        if let Err(e) = server.start().await {
            tracing::error!("Webhook server error: {}", e);
        }
    });
    tracing::info!("Webhook server started on port {}", config.server.port);

    tracing::info!("gdg-gateway initialized successfully");
    tracing::info!("Press Ctrl+C to exit");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    handle.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
