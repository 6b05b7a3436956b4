//! Gemini API HTTP client

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;
use crate::error::{Error, Result};

use super::types::*;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Completion backend used by the orchestrator.
///
/// Implemented by [`GeminiClient`] for production and by scripted mocks in
/// tests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Request a completion for the given turn history and tool declarations.
    async fn complete(
        &self,
        contents: Vec<Content>,
        tools: &[FunctionDeclaration],
    ) -> Result<Completion>;
}

/// Gemini generateContent client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    system_instruction: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(Error::Http)?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url,
            system_instruction: None,
        })
    }

    /// Set the system instruction sent with every request
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        contents: Vec<Content>,
        tools: &[FunctionDeclaration],
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        debug!(model = %self.model, turns = contents.len(), "Sending request to Gemini API");

        let request = GenerateContentRequest {
            contents,
            tools: if tools.is_empty() {
                None
            } else {
                Some(vec![ToolDeclarations {
                    function_declarations: tools.to_vec(),
                }])
            },
            system_instruction: self.system_instruction.as_ref().map(|text| Content {
                role: ROLE_USER.to_string(),
                parts: vec![Part::Text(text.clone())],
            }),
            generation_config: Some(GenerationConfig::default()),
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Gemini API error: {} - {}", status, body);
            return Err(Error::GeminiApi(format!("{}: {}", status, body)));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| Error::GeminiApi(format!("Failed to parse response: {} - {}", e, body)))?;

        info!(
            "Gemini API response: candidates={}, tokens={}",
            parsed.candidates.len(),
            parsed
                .usage_metadata
                .as_ref()
                .map(|u| u.candidates_token_count)
                .unwrap_or(0)
        );

        Ok(parsed)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn complete(
        &self,
        contents: Vec<Content>,
        tools: &[FunctionDeclaration],
    ) -> Result<Completion> {
        let response = self.generate(contents, tools).await?;
        Ok(response.into_completion())
    }
}
