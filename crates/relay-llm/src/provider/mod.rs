//! Model trait and the OpenRouter implementation

pub mod openrouter;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};

use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse};

/// Owned stream of responses from one streaming call
pub type LlmResponseStream = Pin<Box<dyn Stream<Item = Result<LlmResponse, LlmError>> + Send>>;

/// Stream of responses borrowing the model and request
pub type GenerateContentStream<'a> = Pin<Box<dyn Stream<Item = Result<LlmResponse, LlmError>> + Send + 'a>>;

/// A chat model reachable over the network
#[async_trait]
pub trait Model: Send + Sync {
    /// Model identifier sent to the provider
    fn name(&self) -> &str;

    /// Send a non-streaming request, returning the single turn-complete response
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Open a streaming request
    ///
    /// Fails before returning a stream when the request cannot be encoded or
    /// the provider rejects it outright.
    async fn complete_stream(&self, request: &LlmRequest) -> Result<LlmResponseStream, LlmError>;

    /// Lazily generate responses for `request`
    ///
    /// Nothing is sent until the stream is first polled. Yields exactly one
    /// item in non-streaming mode; in streaming mode yields partial text
    /// responses followed by one turn-complete response. Any failure is
    /// yielded as a single error, after which the stream ends. Dropping the
    /// stream early releases the underlying connection.
    fn generate_content<'a>(&'a self, request: &'a LlmRequest, stream: bool) -> GenerateContentStream<'a> {
        Box::pin(async_stream::stream! {
            if !stream {
                yield self.complete(request).await;
                return;
            }

            match self.complete_stream(request).await {
                Ok(mut responses) => {
                    while let Some(response) = responses.next().await {
                        yield response;
                    }
                }
                Err(e) => yield Err(e),
            }
        })
    }
}
