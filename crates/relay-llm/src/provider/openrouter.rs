//! OpenRouter chat completions client

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use relay_config::OpenRouterConfig;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{LlmResponseStream, Model};
use crate::convert::{build_request, convert_finish_reason, convert_usage, to_llm_response};
use crate::error::LlmError;
use crate::protocol::openai::{OpenAiErrorResponse, OpenAiRequest, OpenAiResponse, OpenAiStreamChunk};
use crate::stream::accumulate;
use crate::types::{LlmRequest, LlmResponse};

/// Default OpenRouter API base URL
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Chat model served through OpenRouter's OpenAI-compatible API
pub struct OpenRouterModel {
    name: String,
    client: Client,
    base_url: Url,
    api_key: SecretString,
    app_url: Option<String>,
    app_name: Option<String>,
}

impl std::fmt::Debug for OpenRouterModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterModel")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl OpenRouterModel {
    /// Create a model from connection settings
    ///
    /// `name` uses OpenRouter's `vendor/model` form, e.g. `openai/gpt-4`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Configuration`] if no API key is configured.
    pub fn new(name: impl Into<String>, config: &OpenRouterConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().is_empty())
            .ok_or_else(LlmError::missing_api_key)?;

        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| LlmError::Internal(e.into()))?,
        };

        Ok(Self {
            name: name.into(),
            client: Client::new(),
            base_url,
            api_key,
            app_url: config.app_url.clone(),
            app_name: config.app_name.clone(),
        })
    }

    /// Base URL requests are sent to
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the chat completions URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    fn post(&self, body: &OpenAiRequest) -> RequestBuilder {
        let mut builder = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(body);

        if let Some(url) = &self.app_url {
            builder = builder.header("HTTP-Referer", url);
        }
        if let Some(name) = &self.app_name {
            builder = builder.header("X-Title", name);
        }

        builder
    }

    /// Send a request and reject non-success statuses
    async fn send(&self, body: &OpenAiRequest) -> Result<Response, LlmError> {
        tracing::debug!(
            model = %self.name,
            messages = body.messages.len(),
            tools = body.tools.as_ref().map_or(0, Vec::len),
            stream = body.stream.unwrap_or(false),
            "sending chat completion request"
        );

        let response = self.post(body).send().await.map_err(|e| {
            tracing::debug!(model = %self.name, error = %e, "openrouter request failed");
            LlmError::Upstream(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiErrorResponse>(&body).map_or(body, |e| e.error.message);

            tracing::debug!(model = %self.name, status = %status, "openrouter returned error");
            return Err(LlmError::Upstream(format!("provider returned {status}: {message}")));
        }

        Ok(response)
    }
}

#[async_trait]
impl Model for OpenRouterModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let wire_request = build_request(&self.name, request)?;
        let response = self.send(&wire_request).await?;

        let wire_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Upstream(format!("failed to parse response: {e}")))?;

        let Some(choice) = wire_response.choices.into_iter().next() else {
            return Err(LlmError::NoChoices);
        };

        let mut llm_response = to_llm_response(&choice.message);
        llm_response.turn_complete = true;
        llm_response.finish_reason = Some(convert_finish_reason(choice.finish_reason.as_deref().unwrap_or_default()));
        llm_response.usage_metadata = wire_response.usage.as_ref().and_then(convert_usage);

        Ok(llm_response)
    }

    async fn complete_stream(&self, request: &LlmRequest) -> Result<LlmResponseStream, LlmError> {
        let mut wire_request = build_request(&self.name, request)?;
        wire_request.stream = Some(true);

        let response = self.send(&wire_request).await?;

        Ok(Box::pin(accumulate(sse_chunks(response))))
    }
}

/// Decode the SSE body of a streaming response into wire chunks
///
/// Stops at `[DONE]`. A chunk that fails to parse ends the stream with
/// [`LlmError::StreamRead`]; an error object sent mid-stream ends it with
/// [`LlmError::Upstream`]. SSE comment lines never reach this point.
fn sse_chunks(response: Response) -> impl Stream<Item = Result<OpenAiStreamChunk, LlmError>> + Send {
    async_stream::stream! {
        let mut events = std::pin::pin!(response.bytes_stream().eventsource());

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    yield Err(LlmError::StreamRead(e.to_string()));
                    return;
                }
            };

            let data = event.data.trim();
            if data.is_empty() {
                continue;
            }
            if data == "[DONE]" {
                break;
            }

            let chunk = match serde_json::from_str::<OpenAiStreamChunk>(data) {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(LlmError::StreamRead(format!("invalid chunk: {e}")));
                    return;
                }
            };

            if let Some(error) = chunk.error {
                yield Err(LlmError::Upstream(error.message));
                return;
            }

            yield Ok(chunk);
        }
    }
}
