//! Wire format types for the OpenAI-compatible chat completions API
//!
//! Pure serde structs matching the JSON OpenRouter accepts and returns.
//! They are only used at the HTTP boundary.

pub mod openai;
