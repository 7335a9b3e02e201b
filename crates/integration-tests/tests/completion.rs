mod harness;

use axum::http::StatusCode;
use harness::mock_openrouter::{MockOpenRouter, Reply};
use harness::{API_KEY, completion, generate, model_for};
use relay_config::OpenRouterConfig;
use relay_llm::types::{FunctionDeclaration, Schema, Tool};
use relay_llm::{Content, FinishReason, GenerateConfig, LlmError, LlmRequest, Model, OpenRouterModel, Part};
use serde_json::{Map, Value, json};

#[tokio::test]
async fn text_reply_is_a_single_complete_response() {
    let mock = MockOpenRouter::start(Reply::Json(completion(
        json!({"role": "assistant", "content": "Hello from OpenRouter"}),
        "stop",
    )))
    .await
    .unwrap();
    let model = model_for(&mock, "openai/gpt-4");

    let responses = generate(&model, &LlmRequest::from_text("Hello"), false).await;

    assert_eq!(responses.len(), 1);
    let response = responses.into_iter().next().unwrap().unwrap();
    assert!(response.turn_complete);
    assert!(!response.partial);
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    assert_eq!(response.text(), "Hello from OpenRouter");
    assert_eq!(response.content.as_ref().unwrap().role, "model");

    let usage = response.usage_metadata.unwrap();
    assert_eq!(usage.prompt_token_count, 10);
    assert_eq!(usage.candidates_token_count, 5);
    assert_eq!(usage.total_token_count, 15);
}

#[tokio::test]
async fn request_carries_auth_and_model() {
    let mock = MockOpenRouter::start(Reply::Json(completion(json!({"content": "ok"}), "stop")))
        .await
        .unwrap();
    let model = model_for(&mock, "anthropic/claude-3");

    generate(&model, &LlmRequest::from_text("Hi"), false).await;

    assert_eq!(mock.request_count(), 1);
    assert_eq!(mock.last_header("authorization").as_deref(), Some("Bearer sk-or-test-key"));
    assert_eq!(mock.last_header("http-referer"), None);

    let body = mock.last_body();
    assert_eq!(body["model"], "anthropic/claude-3");
    assert_eq!(body["messages"], json!([{"role": "user", "content": "Hi"}]));
    assert!(body.get("stream").is_none());
    assert!(body.get("tools").is_none());
}

#[tokio::test]
async fn attribution_headers_are_sent_when_configured() {
    let mock = MockOpenRouter::start(Reply::Json(completion(json!({"content": "ok"}), "stop")))
        .await
        .unwrap();
    let config = OpenRouterConfig {
        base_url: Some(mock.base_url().parse().unwrap()),
        app_url: Some("https://example.com".to_owned()),
        app_name: Some("relay tests".to_owned()),
        ..OpenRouterConfig::with_api_key(API_KEY)
    };
    let model = OpenRouterModel::new("openai/gpt-4", &config).unwrap();

    generate(&model, &LlmRequest::from_text("Hi"), false).await;

    assert_eq!(mock.last_header("http-referer").as_deref(), Some("https://example.com"));
    assert_eq!(mock.last_header("x-title").as_deref(), Some("relay tests"));
}

#[tokio::test]
async fn options_system_and_tools_reach_the_wire() {
    let mock = MockOpenRouter::start(Reply::Json(completion(json!({"content": "ok"}), "stop")))
        .await
        .unwrap();
    let model = model_for(&mock, "openai/gpt-4");

    let weather = FunctionDeclaration {
        name: "get_weather".to_owned(),
        description: "Get current weather".to_owned(),
        parameters: Some(
            Schema::of_type("object")
                .with_property("city", Schema::of_type("string"))
                .with_required(["city"]),
        ),
        parameters_json_schema: None,
    };
    let request = LlmRequest::from_text("Weather in Tokyo?").with_config(GenerateConfig {
        system_instruction: Some(Content::from_text("Be brief.", "system")),
        tools: vec![Tool {
            function_declarations: vec![weather],
        }],
        temperature: Some(0.5),
        top_p: None,
        max_output_tokens: Some(256),
        stop_sequences: vec!["END".to_owned()],
    });

    generate(&model, &request, false).await;

    let body = mock.last_body();
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": "Be brief."},
            {"role": "user", "content": "Weather in Tokyo?"}
        ])
    );
    assert_eq!(body["temperature"], 0.5);
    assert!(body.get("top_p").is_none());
    assert_eq!(body["max_completion_tokens"], 256);
    assert_eq!(body["stop"], json!(["END"]));
    assert_eq!(
        body["tools"],
        json!([{
            "type": "function",
            "function": {
                "name": "get_weather",
                "description": "Get current weather",
                "parameters": {
                    "type": "object",
                    "properties": {"city": {"type": "string"}},
                    "required": ["city"]
                }
            }
        }])
    );
}

#[tokio::test]
async fn tool_call_reply_becomes_function_call() {
    let mock = MockOpenRouter::start(Reply::Json(completion(
        json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_abc",
                "type": "function",
                "function": {"name": "get_weather", "arguments": "{\"city\":\"Tokyo\"}"}
            }]
        }),
        "tool_calls",
    )))
    .await
    .unwrap();
    let model = model_for(&mock, "openai/gpt-4");

    let response = model.complete(&LlmRequest::from_text("Weather?")).await.unwrap();

    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    let content = response.content.unwrap();
    assert_eq!(content.parts.len(), 1);
    let call = content.function_calls().next().unwrap();
    assert_eq!(call.id, "call_abc");
    assert_eq!(call.name, "get_weather");
    assert_eq!(Value::Object(call.args.clone()), json!({"city": "Tokyo"}));
}

#[tokio::test]
async fn tool_round_trip_encodes_history() {
    let mock = MockOpenRouter::start(Reply::Json(completion(json!({"content": "It is sunny."}), "stop")))
        .await
        .unwrap();
    let model = model_for(&mock, "openai/gpt-4");

    let mut args = Map::new();
    args.insert("city".to_owned(), json!("Tokyo"));
    let mut result = Map::new();
    result.insert("temp".to_owned(), json!(22));

    let mut call = Part::function_call("get_weather", args);
    if let Part::FunctionCall(call) = &mut call {
        call.id = "call_abc".to_owned();
    }

    let request = LlmRequest {
        contents: vec![
            Content::from_text("Weather in Tokyo?", "user"),
            Content::new("model", vec![call]),
            Content::new(
                "user",
                vec![Part::function_response("call_abc", "get_weather", result)],
            ),
        ],
        config: None,
    };

    let response = model.complete(&request).await.unwrap();
    assert_eq!(response.text(), "It is sunny.");

    let messages = mock.last_body()["messages"].clone();
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["tool_calls"][0]["id"], "call_abc");
    assert_eq!(messages[1]["tool_calls"][0]["function"]["arguments"], "{\"city\":\"Tokyo\"}");
    assert_eq!(messages[2]["role"], "tool");
    assert_eq!(messages[2]["tool_call_id"], "call_abc");
    assert_eq!(messages[2]["content"], "{\"temp\":22}");
}

#[tokio::test]
async fn length_finish_maps_to_max_tokens() {
    let mock = MockOpenRouter::start(Reply::Json(completion(json!({"content": "truncated"}), "length")))
        .await
        .unwrap();
    let model = model_for(&mock, "openai/gpt-4");

    let response = model.complete(&LlmRequest::from_text("Long story")).await.unwrap();

    assert_eq!(response.finish_reason, Some(FinishReason::MaxTokens));
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let mock = MockOpenRouter::start(Reply::Json(json!({"id": "gen-1", "choices": []})))
        .await
        .unwrap();
    let model = model_for(&mock, "openai/gpt-4");

    let responses = generate(&model, &LlmRequest::from_text("Hi"), false).await;

    assert_eq!(responses.len(), 1);
    assert!(matches!(responses[0], Err(LlmError::NoChoices)));
}

#[tokio::test]
async fn http_errors_surface_provider_message() {
    let mock = MockOpenRouter::start(Reply::Error(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"message": "No auth credentials found", "code": 401}}),
    ))
    .await
    .unwrap();
    let model = model_for(&mock, "openai/gpt-4");

    for stream in [false, true] {
        let responses = generate(&model, &LlmRequest::from_text("Hi"), stream).await;

        assert_eq!(responses.len(), 1, "stream = {stream}");
        let Err(LlmError::Upstream(message)) = &responses[0] else {
            panic!("expected upstream error, got {:?}", responses[0]);
        };
        assert!(message.contains("401"), "{message}");
        assert!(message.contains("No auth credentials found"), "{message}");
    }
}

#[tokio::test]
async fn server_error_without_json_body_keeps_raw_text() {
    let mock = MockOpenRouter::start(Reply::Error(StatusCode::INTERNAL_SERVER_ERROR, json!("overloaded")))
        .await
        .unwrap();
    let model = model_for(&mock, "openai/gpt-4");

    let err = model.complete(&LlmRequest::from_text("Hi")).await.unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("openrouter error: provider returned 500"), "{message}");
    assert!(message.contains("overloaded"), "{message}");
}

#[tokio::test]
async fn unreachable_server_is_an_upstream_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = OpenRouterConfig {
        base_url: Some(format!("http://{addr}/api/v1").parse().unwrap()),
        ..OpenRouterConfig::with_api_key(API_KEY)
    };
    let model = OpenRouterModel::new("openai/gpt-4", &config).unwrap();

    let err = model.complete(&LlmRequest::from_text("Hi")).await.unwrap_err();

    assert!(matches!(err, LlmError::Upstream(_)));
}

#[tokio::test]
async fn nothing_is_sent_until_polled() {
    let mock = MockOpenRouter::start(Reply::Json(completion(json!({"content": "ok"}), "stop")))
        .await
        .unwrap();
    let model = model_for(&mock, "openai/gpt-4");
    let request = LlmRequest::from_text("Hi");

    let responses = model.generate_content(&request, false);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(mock.request_count(), 0);

    drop(responses);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn echoed_text_round_trips_in_both_modes() {
    let mock = MockOpenRouter::start(Reply::Echo).await.unwrap();
    let model = model_for(&mock, "openai/gpt-4");

    for input in ["Hello, world", "こんにちは 🌍 café", "   \t ", "line one\nline two"] {
        for stream in [false, true] {
            let responses: Vec<_> = generate(&model, &LlmRequest::from_text(input), stream)
                .await
                .into_iter()
                .map(Result::unwrap)
                .collect();

            let (last, partials) = responses.split_last().unwrap();
            assert!(last.turn_complete, "stream={stream} input={input:?}");
            assert_eq!(last.text(), input, "stream={stream}");
            assert_eq!(last.finish_reason, Some(FinishReason::Stop));

            if stream {
                assert!(!partials.is_empty());
                assert!(partials.iter().all(|r| r.partial));
                let joined: String = partials.iter().map(relay_llm::LlmResponse::text).collect();
                assert_eq!(joined, input);
            } else {
                assert!(partials.is_empty());
            }
        }
    }
}
