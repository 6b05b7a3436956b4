//! Gemini API client and wire types

mod client;
mod types;

pub use client::{ChatModel, GeminiClient};
pub use types::*;
