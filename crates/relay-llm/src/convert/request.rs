//! Generic request -> `OpenAI` wire request

use crate::error::LlmError;
use crate::protocol::openai::{
    OpenAiFunctionCall, OpenAiMessage, OpenAiRequest, OpenAiToolCall, ROLE_ASSISTANT, ROLE_SYSTEM, ROLE_TOOL,
    ROLE_USER, TOOL_TYPE_FUNCTION,
};
use crate::types::{Content, LlmRequest, Part};

use super::schema::convert_function_declaration;

/// Build the wire request for `model` from a generic request
///
/// A system instruction is always placed first, even if the turns already
/// contain a system turn. Generation options are copied only when set.
///
/// # Errors
///
/// Returns [`LlmError::Encoding`] if function arguments or a function
/// response cannot be serialized.
pub fn build_request(model: &str, request: &LlmRequest) -> Result<OpenAiRequest, LlmError> {
    let mut wire = OpenAiRequest {
        model: model.to_owned(),
        ..OpenAiRequest::default()
    };

    for content in &request.contents {
        wire.messages.extend(convert_content(content)?);
    }

    let Some(config) = &request.config else {
        return Ok(wire);
    };

    if let Some(instruction) = &config.system_instruction {
        wire.messages.insert(
            0,
            OpenAiMessage {
                role: ROLE_SYSTEM.to_owned(),
                content: Some(extract_text(instruction)),
                ..OpenAiMessage::default()
            },
        );
    }

    let tools: Vec<_> = config
        .tools
        .iter()
        .flat_map(|tool| &tool.function_declarations)
        .map(convert_function_declaration)
        .collect();
    if !tools.is_empty() {
        wire.tools = Some(tools);
    }

    wire.temperature = config.temperature;
    wire.top_p = config.top_p;
    wire.max_completion_tokens = config.max_output_tokens;
    if !config.stop_sequences.is_empty() {
        wire.stop = Some(config.stop_sequences.clone());
    }

    Ok(wire)
}

/// Convert one turn into wire messages
///
/// Every function response becomes its own `tool` message. Text parts and
/// function calls are folded into a single trailing message, which is
/// omitted when the turn has neither.
///
/// # Errors
///
/// Returns [`LlmError::Encoding`] if arguments or responses fail to serialize.
pub fn convert_content(content: &Content) -> Result<Vec<OpenAiMessage>, LlmError> {
    let mut messages = Vec::new();
    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();

    for part in &content.parts {
        match part {
            Part::Text(text) => {
                if !text.is_empty() {
                    texts.push(text.as_str());
                }
            }
            Part::FunctionCall(call) => {
                tool_calls.push(OpenAiToolCall {
                    id: call.id.clone(),
                    tool_type: TOOL_TYPE_FUNCTION.to_owned(),
                    function: OpenAiFunctionCall {
                        name: call.name.clone(),
                        arguments: serde_json::to_string(&call.args)?,
                    },
                });
            }
            Part::FunctionResponse(response) => {
                messages.push(OpenAiMessage {
                    role: ROLE_TOOL.to_owned(),
                    content: Some(serde_json::to_string(&response.response)?),
                    tool_call_id: Some(response.id.clone()),
                    ..OpenAiMessage::default()
                });
            }
        }
    }

    if texts.is_empty() && tool_calls.is_empty() {
        return Ok(messages);
    }

    // Only assistant messages may carry tool calls
    let role = if tool_calls.is_empty() {
        convert_role(&content.role)
    } else {
        ROLE_ASSISTANT
    };

    messages.push(OpenAiMessage {
        role: role.to_owned(),
        content: (!texts.is_empty()).then(|| join_strings(&texts)),
        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
        tool_call_id: None,
    });

    Ok(messages)
}

/// Map a generic role onto the wire vocabulary
///
/// Matching is exact; anything unrecognized is sent as a user message.
pub fn convert_role(role: &str) -> &'static str {
    match role {
        "model" | "assistant" => ROLE_ASSISTANT,
        "system" => ROLE_SYSTEM,
        "tool" => ROLE_TOOL,
        _ => ROLE_USER,
    }
}

/// Concatenate all text parts of a turn
pub fn extract_text(content: &Content) -> String {
    let texts: Vec<&str> = content
        .parts
        .iter()
        .filter_map(Part::as_text)
        .filter(|text| !text.is_empty())
        .collect();

    join_strings(&texts)
}

/// Join strings with no separator
pub fn join_strings<S: AsRef<str>>(strings: &[S]) -> String {
    strings.iter().fold(String::new(), |mut joined, s| {
        joined.push_str(s.as_ref());
        joined
    })
}
