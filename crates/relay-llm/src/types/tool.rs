use serde::{Deserialize, Serialize};

use super::schema::Schema;

/// Group of function declarations offered to the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Declared functions
    #[serde(default)]
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// Declaration of a callable function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Function name
    pub name: String,
    /// What the function does
    #[serde(default)]
    pub description: String,
    /// Structured parameter schema, preferred when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Schema>,
    /// Pre-built JSON Schema, used when `parameters` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters_json_schema: Option<serde_json::Value>,
}
