use serde::{Deserialize, Serialize};

use super::content::Content;
use super::tool::Tool;

/// Generation options for a single request
///
/// Unset numeric options leave the provider default in place; `Some(0.0)`
/// is an explicit value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Instruction sent as a leading system message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

/// Generic chat request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Conversation turns, oldest first
    #[serde(default)]
    pub contents: Vec<Content>,
    /// Generation options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerateConfig>,
}

impl LlmRequest {
    /// Request holding a single user text turn
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::from_text(text, super::ROLE_USER)],
            config: None,
        }
    }

    /// Attach generation options
    #[must_use]
    pub fn with_config(mut self, config: GenerateConfig) -> Self {
        self.config = Some(config);
        self
    }
}
