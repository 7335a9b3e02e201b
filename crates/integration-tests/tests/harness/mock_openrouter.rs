//! Mock OpenRouter backend for integration tests
//!
//! Serves one canned reply on `/api/v1/chat/completions` and records what
//! the client sent.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::stream;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum Reply {
    /// A non-streaming completion body
    Json(Value),
    /// SSE events, one `data:` line per entry, sent verbatim
    Events(Vec<String>),
    /// A non-success status with a JSON error body
    Error(StatusCode, Value),
    /// The same SSE event repeated every few milliseconds until the client
    /// goes away
    Endless(String),
    /// A raw `text/event-stream` body, sent as is
    Raw(String),
    /// Answer with the content of the last user message, streamed in small
    /// pieces when the request asks for a stream
    Echo,
}

/// Mock backend bound to a random local port
pub struct MockOpenRouter {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    reply: Reply,
    request_count: AtomicU32,
    last_body: Mutex<Option<Value>>,
    last_headers: Mutex<Option<HeaderMap>>,
    /// Set once an endless body has been dropped by the server
    stream_released: Arc<AtomicBool>,
}

impl MockOpenRouter {
    /// Start the mock server, returning immediately
    pub async fn start(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            reply,
            request_count: AtomicU32::new(0),
            last_body: Mutex::new(None),
            last_headers: Mutex::new(None),
            stream_released: Arc::new(AtomicBool::new(false)),
        });

        let app = Router::new()
            .route("/api/v1/chat/completions", routing::post(handle_chat_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL to configure the client with
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Number of completion requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// JSON body of the most recent request
    pub fn last_body(&self) -> Value {
        self.state.last_body.lock().unwrap().clone().unwrap_or(Value::Null)
    }

    /// Value of a header on the most recent request
    pub fn last_header(&self, name: &str) -> Option<String> {
        self.state
            .last_headers
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|headers| headers.get(name))
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    }

    /// Whether an endless body has been torn down
    pub fn stream_released(&self) -> bool {
        self.state.stream_released.load(Ordering::SeqCst)
    }
}

impl Drop for MockOpenRouter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Flags its owner's drop
struct ReleaseGuard(Arc<AtomicBool>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    let echo = last_user_content(&body);
    let stream = body["stream"].as_bool().unwrap_or(false);
    *state.last_body.lock().unwrap() = Some(body);
    *state.last_headers.lock().unwrap() = Some(headers);

    match &state.reply {
        Reply::Json(value) => Json(value.clone()).into_response(),
        Reply::Error(status, value) => (*status, Json(value.clone())).into_response(),
        Reply::Events(events) => {
            let body: String = events.iter().map(|event| format!("data: {event}\n\n")).collect();
            sse(Body::from(body))
        }
        Reply::Endless(event) => {
            let guard = ReleaseGuard(Arc::clone(&state.stream_released));
            let frame = format!("data: {event}\n\n");

            let events = stream::unfold((guard, frame), |(guard, frame)| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                let item = Ok::<_, Infallible>(frame.clone());
                Some((item, (guard, frame)))
            });

            sse(Body::from_stream(events))
        }
        Reply::Raw(body) => sse(Body::from(body.clone())),
        Reply::Echo if stream => {
            let chars: Vec<char> = echo.chars().collect();
            let mut body: String = chars
                .chunks(3)
                .map(|piece| {
                    let text: String = piece.iter().collect();
                    let delta = json!({"choices": [{"index": 0, "delta": {"content": text}}]});
                    format!("data: {delta}\n\n")
                })
                .collect();
            let finish = json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]});
            body.push_str(&format!("data: {finish}\n\ndata: [DONE]\n\n"));
            sse(Body::from(body))
        }
        Reply::Echo => Json(json!({
            "id": "gen-echo",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": echo},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
    }
}

fn last_user_content(body: &Value) -> String {
    body["messages"]
        .as_array()
        .into_iter()
        .flatten()
        .rev()
        .find(|message| message["role"] == "user")
        .and_then(|message| message["content"].as_str())
        .unwrap_or_default()
        .to_owned()
}

fn sse(body: Body) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}
