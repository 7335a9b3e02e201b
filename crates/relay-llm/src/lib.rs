//! OpenRouter chat adapter
//!
//! Exposes OpenRouter's OpenAI-compatible chat completions API through a
//! provider-neutral [`Model`] interface. Conversations, tool declarations and
//! generation options are expressed with the generic types in [`types`];
//! [`convert`] maps them to and from the wire format, and [`stream`]
//! reassembles incremental SSE chunks into partial and final responses.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod stream;
pub mod types;

pub use error::LlmError;
pub use provider::openrouter::{DEFAULT_BASE_URL, OpenRouterModel};
pub use provider::{GenerateContentStream, LlmResponseStream, Model};
pub use stream::StreamAccumulator;
pub use types::{Content, FinishReason, GenerateConfig, LlmRequest, LlmResponse, Part};
