//! Generic chat types exchanged with the agent framework
//!
//! A conversation is a list of role-tagged [`Content`] turns, each made of
//! text, function-call and function-response parts. These types know nothing
//! about the OpenAI wire format; see [`crate::convert`] for the mapping.

pub mod content;
pub mod request;
pub mod response;
pub mod schema;
pub mod tool;

pub use content::{Content, FunctionCall, FunctionResponse, Part, ROLE_MODEL, ROLE_USER};
pub use request::{GenerateConfig, LlmRequest};
pub use response::{FinishReason, LlmResponse, UsageMetadata};
pub use schema::Schema;
pub use tool::{FunctionDeclaration, Tool};
