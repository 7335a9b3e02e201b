//! Conversion between the generic chat types and the `OpenAI` wire format
//!
//! Request conversion can fail only while JSON-encoding function arguments;
//! response conversion never fails.

pub mod request;
pub mod response;
pub mod schema;

pub use request::{build_request, convert_content, convert_role, extract_text, join_strings};
pub use response::{convert_finish_reason, convert_usage, to_llm_response};
pub use schema::{convert_function_declaration, convert_schema};
