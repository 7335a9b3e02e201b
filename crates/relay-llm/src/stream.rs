//! Accumulation of streaming chunks into generic responses
//!
//! Text fragments are forwarded as partial responses the moment they arrive.
//! Tool-call fragments are merged silently and only surface in the final,
//! turn-complete response built when a chunk carries a finish reason.

use futures_util::{Stream, StreamExt};

use crate::convert::{convert_finish_reason, convert_usage, to_llm_response};
use crate::error::LlmError;
use crate::protocol::openai::{
    OpenAiMessage, OpenAiStreamChunk, OpenAiStreamToolCall, OpenAiToolCall, OpenAiUsage, ROLE_ASSISTANT,
    TOOL_TYPE_FUNCTION,
};
use crate::types::{Content, LlmResponse, ROLE_MODEL};

/// Highest number of parallel tool calls accepted in one turn
pub const MAX_TOOL_CALL_SLOTS: usize = 128;

/// State of one in-flight streaming call
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    tool_calls: Vec<OpenAiToolCall>,
    usage: Option<OpenAiUsage>,
    closed: bool,
}

impl StreamAccumulator {
    /// Fresh accumulator in the open state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a finish reason has been seen
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Text received so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Tool calls merged so far, indexed by their stream slot
    pub fn tool_calls(&self) -> &[OpenAiToolCall] {
        &self.tool_calls
    }

    /// Feed one chunk, returning the responses it produces
    ///
    /// At most two responses come back: a partial for new text and the
    /// final response when the chunk finishes the turn. Chunks arriving
    /// after the turn finished are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::StreamRead`] if a tool-call fragment addresses a
    /// slot at or beyond [`MAX_TOOL_CALL_SLOTS`].
    pub fn push(&mut self, chunk: &OpenAiStreamChunk) -> Result<Vec<LlmResponse>, LlmError> {
        let mut responses = Vec::new();

        if self.closed {
            return Ok(responses);
        }

        if let Some(usage) = chunk.usage {
            self.usage = Some(usage);
        }

        let Some(choice) = chunk.choices.first() else {
            return Ok(responses);
        };

        if let Some(text) = choice.delta.content.as_deref().filter(|text| !text.is_empty()) {
            self.text.push_str(text);
            responses.push(LlmResponse {
                content: Some(Content::from_text(text, ROLE_MODEL)),
                partial: true,
                ..LlmResponse::default()
            });
        }

        for delta in choice.delta.tool_calls.iter().flatten() {
            self.merge_tool_call(delta)?;
        }

        if let Some(reason) = choice.finish_reason.as_deref().filter(|reason| !reason.is_empty()) {
            responses.push(self.finish(reason));
        }

        Ok(responses)
    }

    /// Merge one tool-call fragment into its slot
    ///
    /// Identity fields overwrite when present; argument fragments append.
    fn merge_tool_call(&mut self, delta: &OpenAiStreamToolCall) -> Result<(), LlmError> {
        let Some(index) = delta.index else {
            return Ok(());
        };

        if index >= MAX_TOOL_CALL_SLOTS {
            return Err(LlmError::StreamRead(format!(
                "tool call index {index} exceeds limit of {MAX_TOOL_CALL_SLOTS}"
            )));
        }

        if self.tool_calls.len() <= index {
            self.tool_calls.resize_with(index + 1, OpenAiToolCall::default);
        }
        let slot = &mut self.tool_calls[index];

        if let Some(id) = delta.id.as_deref().filter(|id| !id.is_empty()) {
            id.clone_into(&mut slot.id);
        }
        if let Some(tool_type) = delta.tool_type.as_deref().filter(|t| !t.is_empty()) {
            tool_type.clone_into(&mut slot.tool_type);
        }
        if let Some(function) = &delta.function {
            if let Some(name) = function.name.as_deref().filter(|name| !name.is_empty()) {
                name.clone_into(&mut slot.function.name);
            }
            if let Some(arguments) = &function.arguments {
                slot.function.arguments.push_str(arguments);
            }
        }

        Ok(())
    }

    /// Assemble the turn-complete response and close
    fn finish(&mut self, reason: &str) -> LlmResponse {
        self.closed = true;

        let tool_calls: Vec<_> = std::mem::take(&mut self.tool_calls)
            .into_iter()
            .map(|mut call| {
                // Some gateways only send `type` on the first fragment, or never
                if call.tool_type.is_empty() {
                    TOOL_TYPE_FUNCTION.clone_into(&mut call.tool_type);
                }
                call
            })
            .collect();

        let message = OpenAiMessage {
            role: ROLE_ASSISTANT.to_owned(),
            content: Some(std::mem::take(&mut self.text)),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            tool_call_id: None,
        };

        let mut response = to_llm_response(&message);
        response.partial = false;
        response.turn_complete = true;
        response.finish_reason = Some(convert_finish_reason(reason));
        response.usage_metadata = self.usage.as_ref().and_then(convert_usage);
        response
    }
}

/// Turn a stream of wire chunks into a stream of generic responses
///
/// Ends after the first chunk carrying a finish reason, without reading
/// further. A read error or an out-of-range tool-call slot is yielded once
/// and ends the stream. If the source runs dry before any finish reason,
/// nothing more is yielded.
pub fn accumulate<S>(chunks: S) -> impl Stream<Item = Result<LlmResponse, LlmError>> + Send
where
    S: Stream<Item = Result<OpenAiStreamChunk, LlmError>> + Send,
{
    async_stream::try_stream! {
        let mut chunks = std::pin::pin!(chunks);
        let mut accumulator = StreamAccumulator::new();

        while let Some(chunk) = chunks.next().await {
            for response in accumulator.push(&chunk?)? {
                yield response;
            }

            if accumulator.is_closed() {
                break;
            }
        }

        if !accumulator.is_closed() {
            tracing::warn!(
                buffered_chars = accumulator.text().len(),
                buffered_tool_calls = accumulator.tool_calls().len(),
                "stream ended without a finish reason, dropping buffered output"
            );
        }
    }
}
