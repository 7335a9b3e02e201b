//! Tool declarations and parameter schemas

use serde_json::{Map, Value};

use crate::protocol::openai::{OpenAiFunction, OpenAiTool, TOOL_TYPE_FUNCTION};
use crate::types::{FunctionDeclaration, Schema};

/// Convert a structured schema into a JSON Schema object
///
/// Unset fields are omitted rather than emitted as `null`.
pub fn convert_schema(schema: &Schema) -> Map<String, Value> {
    let mut result = Map::new();

    if !schema.schema_type.is_empty() {
        result.insert("type".to_owned(), Value::String(schema.schema_type.clone()));
    }
    if !schema.description.is_empty() {
        result.insert("description".to_owned(), Value::String(schema.description.clone()));
    }
    if !schema.enum_values.is_empty() {
        result.insert("enum".to_owned(), string_list(&schema.enum_values));
    }
    if let Some(items) = &schema.items {
        result.insert("items".to_owned(), Value::Object(convert_schema(items)));
    }
    if !schema.properties.is_empty() {
        let properties = schema
            .properties
            .iter()
            .map(|(name, property)| (name.clone(), Value::Object(convert_schema(property))))
            .collect();
        result.insert("properties".to_owned(), Value::Object(properties));
    }
    if !schema.required.is_empty() {
        result.insert("required".to_owned(), string_list(&schema.required));
    }

    result
}

/// Convert a function declaration into an `OpenAI` tool definition
///
/// The structured schema wins over the pre-built JSON schema; with neither
/// the function takes no arguments and `parameters` is left out.
pub fn convert_function_declaration(declaration: &FunctionDeclaration) -> OpenAiTool {
    let parameters = match (&declaration.parameters, &declaration.parameters_json_schema) {
        (Some(schema), _) => Some(Value::Object(convert_schema(schema))),
        (None, Some(json_schema)) => Some(json_schema.clone()),
        (None, None) => None,
    };

    OpenAiTool {
        tool_type: TOOL_TYPE_FUNCTION.to_owned(),
        function: OpenAiFunction {
            name: declaration.name.clone(),
            description: declaration.description.clone(),
            parameters,
        },
    }
}

fn string_list(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}
