//! Configuration management
//!
//! Settings are resolved in the following order:
//! 1. Environment variables
//! 2. gdg-gateway.toml configuration file
//! 3. Defaults
//!
//! Inside the config file, `${VAR_NAME}` expands to the value of the
//! corresponding environment variable.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL (optional, for custom endpoints or tests)
    pub base_url: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

/// Twilio WhatsApp configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwilioConfig {
    /// Account SID
    pub account_sid: String,

    /// Auth token
    pub auth_token: String,

    /// WhatsApp-enabled phone number (E.164, without the `whatsapp:` prefix)
    pub phone_number: String,
}

/// Google data-source configuration (Calendar + Sheets, read-only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// API key with read access to the calendar and spreadsheet
    pub api_key: String,

    /// Calendar ID holding community events
    pub calendar_id: String,

    /// Spreadsheet ID holding the FAQs and Speakers sheets
    pub sheet_id: String,
}

/// Webhook server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port for the webhook HTTP server
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

/// Main configuration for gdg-gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Twilio configuration
    #[serde(default)]
    pub twilio: TwilioConfig,

    /// Google data-source configuration
    #[serde(default)]
    pub google: GoogleConfig,

    /// Webhook server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` references to environment variable values.
    ///
    /// Unknown variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, expanding `${VAR_NAME}` references
    /// and applying environment-variable overrides afterwards.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let toml_content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let mut config: Config = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default locations.
    ///
    /// Tries `./gdg-gateway.toml` first, then falls back to environment
    /// variables only.
    pub fn load() -> crate::Result<Self> {
        if Path::new("gdg-gateway.toml").exists() {
            return Self::from_toml_file("gdg-gateway.toml");
        }

        Self::from_env()
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override settings from environment variables (environment wins).
    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            if !api_key.is_empty() {
                self.gemini.api_key = api_key;
            }
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.is_empty() {
                self.gemini.model = model;
            }
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            if !base_url.is_empty() {
                self.gemini.base_url = Some(base_url);
            }
        }

        if let Ok(sid) = std::env::var("TWILIO_ACCOUNT_SID") {
            self.twilio.account_sid = sid;
        }
        if let Ok(token) = std::env::var("TWILIO_AUTH_TOKEN") {
            self.twilio.auth_token = token;
        }
        if let Ok(number) = std::env::var("TWILIO_PHONE_NUMBER") {
            self.twilio.phone_number = number;
        }

        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            self.google.api_key = key;
        }
        if let Ok(id) = std::env::var("GOOGLE_CALENDAR_ID") {
            self.google.calendar_id = id;
        }
        if let Ok(id) = std::env::var("GOOGLE_SHEET_ID") {
            self.google.sheet_id = id;
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.gemini.api_key.is_empty() {
            return Err(Error::Config(
                "GEMINI_API_KEY is not set (environment or [gemini] api_key)".to_string(),
            ));
        }
        Ok(())
    }
}
