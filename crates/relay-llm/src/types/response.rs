use serde::{Deserialize, Serialize};

use super::content::{Content, Part};

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Reason not reported or not recognized
    #[default]
    Unspecified,
    /// Orderly end of generation, including tool-call turns
    Stop,
    /// Output token limit reached
    MaxTokens,
}

/// Token accounting for one response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    /// Tokens in the prompt
    pub prompt_token_count: u32,
    /// Tokens generated
    pub candidates_token_count: u32,
    /// Prompt plus generated tokens
    pub total_token_count: u32,
}

/// Generic chat response
///
/// Streaming calls produce several partial responses followed by one
/// turn-complete response; non-streaming calls produce exactly one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Incremental fragment of a streaming reply
    #[serde(default)]
    pub partial: bool,
    /// Last response of the turn
    #[serde(default)]
    pub turn_complete: bool,
    /// Present on the turn-complete response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Token usage, when reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

impl LlmResponse {
    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.content
            .as_ref()
            .map(|content| content.parts.iter().filter_map(Part::as_text).collect())
            .unwrap_or_default()
    }
}
