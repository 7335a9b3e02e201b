//! `OpenAI` wire response -> generic response

use serde_json::{Map, Value};

use crate::protocol::openai::{OpenAiMessage, OpenAiUsage, TOOL_TYPE_FUNCTION};
use crate::types::{Content, FinishReason, FunctionCall, LlmResponse, Part, ROLE_MODEL, UsageMetadata};

/// Convert a reply message into a generic response
///
/// The result carries only content; completion flags, finish reason and
/// usage are set by the caller.
pub fn to_llm_response(message: &OpenAiMessage) -> LlmResponse {
    let mut parts = Vec::new();

    if let Some(text) = message.content.as_deref().filter(|text| !text.is_empty()) {
        parts.push(Part::Text(text.to_owned()));
    }

    for call in message.tool_calls.iter().flatten() {
        if call.tool_type != TOOL_TYPE_FUNCTION {
            continue;
        }

        parts.push(Part::FunctionCall(FunctionCall {
            id: call.id.clone(),
            name: call.function.name.clone(),
            args: parse_arguments(&call.function.arguments),
        }));
    }

    LlmResponse {
        content: Some(Content::new(ROLE_MODEL, parts)),
        ..LlmResponse::default()
    }
}

/// Decode JSON-encoded tool arguments
///
/// One garbled tool call must not fail the whole reply, so anything that is
/// not a JSON object decodes to an empty map.
fn parse_arguments(arguments: &str) -> Map<String, Value> {
    if arguments.is_empty() {
        return Map::new();
    }

    match serde_json::from_str::<Value>(arguments) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::debug!(arguments = %arguments, "tool call arguments are not a JSON object");
            Map::new()
        }
    }
}

/// Map a wire finish reason onto the generic one
///
/// Tool-call stops count as an orderly [`FinishReason::Stop`].
pub fn convert_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" | "tool_calls" | "function_call" => FinishReason::Stop,
        "length" => FinishReason::MaxTokens,
        _ => FinishReason::Unspecified,
    }
}

/// Convert wire usage, skipping reports that count nothing
pub fn convert_usage(usage: &OpenAiUsage) -> Option<UsageMetadata> {
    (usage.total_tokens > 0).then_some(UsageMetadata {
        prompt_token_count: usage.prompt_tokens,
        candidates_token_count: usage.completion_tokens,
        total_token_count: usage.total_tokens,
    })
}
