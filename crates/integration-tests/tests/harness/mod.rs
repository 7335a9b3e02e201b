#![allow(dead_code)]

pub mod mock_openrouter;

use futures_util::StreamExt;
use relay_config::OpenRouterConfig;
use relay_llm::{LlmError, LlmRequest, LlmResponse, Model, OpenRouterModel};
use serde_json::{Value, json};

use mock_openrouter::MockOpenRouter;

pub const API_KEY: &str = "sk-or-test-key";

/// Build a model pointed at the mock
pub fn model_for(mock: &MockOpenRouter, name: &str) -> OpenRouterModel {
    let config = OpenRouterConfig {
        base_url: Some(mock.base_url().parse().unwrap()),
        ..OpenRouterConfig::with_api_key(API_KEY)
    };
    OpenRouterModel::new(name, &config).unwrap()
}

/// Drain `generate_content` into a vector
pub async fn generate(model: &OpenRouterModel, request: &LlmRequest, stream: bool) -> Vec<Result<LlmResponse, LlmError>> {
    model.generate_content(request, stream).collect().await
}

/// A non-streaming completion body with one choice
pub fn completion(message: Value, finish_reason: &str) -> Value {
    json!({
        "id": "gen-test-123",
        "model": "openai/gpt-4",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": finish_reason
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

/// A streaming chunk carrying `delta` and an optional finish reason
pub fn chunk(delta: Value, finish_reason: Option<&str>) -> String {
    json!({
        "id": "gen-test-stream",
        "choices": [{
            "index": 0,
            "delta": delta,
            "finish_reason": finish_reason
        }]
    })
    .to_string()
}

/// A streaming chunk carrying only text
pub fn text_chunk(text: &str) -> String {
    chunk(json!({"content": text}), None)
}
