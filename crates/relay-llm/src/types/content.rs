use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of end-user turns
pub const ROLE_USER: &str = "user";

/// Role of turns produced by the model
pub const ROLE_MODEL: &str = "model";

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Author role, usually `user` or `model`; unknown values are kept as-is
    #[serde(default)]
    pub role: String,
    /// Ordered parts of the turn
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a turn from parts
    pub fn new(role: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            role: role.into(),
            parts,
        }
    }

    /// Create a turn holding a single text part
    pub fn from_text(text: impl Into<String>, role: impl Into<String>) -> Self {
        Self::new(role, vec![Part::Text(text.into())])
    }

    /// Iterate over the function calls in this turn
    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.parts.iter().filter_map(|part| match part {
            Part::FunctionCall(call) => Some(call),
            _ => None,
        })
    }
}

/// A single piece of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    /// Plain text
    Text(String),
    /// Request from the model to invoke a caller-defined function
    FunctionCall(FunctionCall),
    /// Result of a function invocation, sent back to the model
    FunctionResponse(FunctionResponse),
}

impl Part {
    /// Text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Function-call part without an id
    pub fn function_call(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self::FunctionCall(FunctionCall {
            id: String::new(),
            name: name.into(),
            args,
        })
    }

    /// Function-response part answering the call with `id`
    pub fn function_response(id: impl Into<String>, name: impl Into<String>, response: Map<String, Value>) -> Self {
        Self::FunctionResponse(FunctionResponse {
            id: id.into(),
            name: name.into(),
            response,
        })
    }

    /// Text of this part, if it is a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Function invocation requested by the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Correlation id echoed back in the matching [`FunctionResponse`]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Function name
    pub name: String,
    /// Named arguments
    #[serde(default)]
    pub args: Map<String, Value>,
}

/// Result of a function invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Id of the call this responds to
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Function name
    pub name: String,
    /// Structured result
    #[serde(default)]
    pub response: Map<String, Value>,
}
