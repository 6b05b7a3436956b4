//! Gemini generateContent API types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Role for a user turn
pub const ROLE_USER: &str = "user";
/// Role for a model turn
pub const ROLE_MODEL: &str = "model";
/// Role for a tool-result turn
pub const ROLE_TOOL: &str = "tool";

/// One turn of conversation content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user turn with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Create a model turn with text
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ROLE_MODEL.to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Create a tool-result turn carrying one function response
    pub fn tool_result(name: impl Into<String>, response: JsonValue) -> Self {
        Self {
            role: ROLE_TOOL.to_string(),
            parts: vec![Part::FunctionResponse(FunctionResponse {
                name: name.into(),
                response,
            })],
        }
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| {
                if let Part::Text(text) = p {
                    Some(text.as_str())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Function calls contained in this content
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|p| {
                if let Part::FunctionCall(call) = p {
                    Some(call)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// One part of a content block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

/// A function invocation requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: JsonValue,
}

/// The outcome of a function invocation, fed back to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: JsonValue,
}

/// Declaration of a callable function (name, description, parameter schema)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
}

impl FunctionDeclaration {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: JsonValue,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Tool wrapper as the API expects it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDeclarations {
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// Sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// generateContent request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDeclarations>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// generateContent response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
}

/// A parsed completion: the model's text plus any requested function calls
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: String,
    pub function_calls: Vec<FunctionCall>,
}

impl Completion {
    /// Build a text-only completion (handy in tests)
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            function_calls: Vec::new(),
        }
    }

    pub fn has_function_calls(&self) -> bool {
        !self.function_calls.is_empty()
    }
}

impl GenerateContentResponse {
    /// Flatten the first candidate into a [`Completion`]
    pub fn into_completion(self) -> Completion {
        let Some(content) = self.candidates.into_iter().next().and_then(|c| c.content) else {
            return Completion::default();
        };

        let mut text_parts = Vec::new();
        let mut function_calls = Vec::new();
        for part in content.parts {
            match part {
                Part::Text(text) => text_parts.push(text),
                Part::FunctionCall(call) => function_calls.push(call),
                Part::FunctionResponse(_) => {}
            }
        }

        Completion {
            text: text_parts.join("\n"),
            function_calls,
        }
    }
}
