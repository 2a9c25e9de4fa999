//! Mock OpenRouter server for integration tests
//!
//! Implements `/v1/chat/completions` with switches for the failure modes the
//! driver has to handle: transient 500s, rejected `response_format` values,
//! truncated output and missing usage data.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Mock OpenRouter endpoint that records every request body
pub struct MockOpenRouter {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

/// Behaviour switches for [`MockOpenRouter`]
#[derive(Debug, Clone)]
pub struct MockBuilder {
    fail_count: u32,
    reject_json_schema: bool,
    reject_json_object: bool,
    content: String,
    finish_reason: String,
    include_usage: bool,
    cost: f64,
}

struct MockState {
    request_count: AtomicU32,
    /// Number of requests to fail with 500 before behaving normally
    fail_count: AtomicU32,
    options: MockBuilder,
    bodies: Mutex<Vec<serde_json::Value>>,
    authorization: Mutex<Vec<Option<String>>>,
}

impl MockBuilder {
    /// Fail the first `n` requests with 500
    pub const fn fail_first(mut self, n: u32) -> Self {
        self.fail_count = n;
        self
    }

    /// Answer 400 to requests with `response_format.type == "json_schema"`
    pub const fn reject_json_schema(mut self) -> Self {
        self.reject_json_schema = true;
        self
    }

    /// Answer 400 to requests with `response_format.type == "json_object"`
    pub const fn reject_json_object(mut self) -> Self {
        self.reject_json_object = true;
        self
    }

    /// Assistant message content
    pub fn content(mut self, content: &str) -> Self {
        content.clone_into(&mut self.content);
        self
    }

    /// Finish reason of the only choice
    pub fn finish_reason(mut self, reason: &str) -> Self {
        reason.clone_into(&mut self.finish_reason);
        self
    }

    /// Leave the `usage` block out of responses
    pub const fn without_usage(mut self) -> Self {
        self.include_usage = false;
        self
    }

    /// Cost reported in the `usage` block
    pub const fn cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Start the server, returning once it is listening
    pub async fn start(self) -> anyhow::Result<MockOpenRouter> {
        let state = Arc::new(MockState {
            request_count: AtomicU32::new(0),
            fail_count: AtomicU32::new(self.fail_count),
            options: self,
            bodies: Mutex::new(Vec::new()),
            authorization: Mutex::new(Vec::new()),
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

        Ok(MockOpenRouter { addr, shutdown, state })
    }
}

impl Default for MockBuilder {
    fn default() -> Self {
        Self {
            fail_count: 0,
            reject_json_schema: false,
            reject_json_object: false,
            content: "Hello from mock OpenRouter".to_owned(),
            finish_reason: "stop".to_owned(),
            include_usage: true,
            cost: 0.000_15,
        }
    }
}

impl MockOpenRouter {
    /// Configure a new mock
    pub fn builder() -> MockBuilder {
        MockBuilder::default()
    }

    /// Start a mock with default behaviour
    pub async fn start() -> anyhow::Result<Self> {
        Self::builder().start().await
    }

    /// Base URL in the same shape as `https://openrouter.ai/api/v1`
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Number of completion requests received, failed ones included
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Request bodies in arrival order
    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.state.bodies.lock().unwrap().clone()
    }

    /// `response_format.type` of each request, `"plain"` when absent
    pub fn formats(&self) -> Vec<String> {
        self.bodies()
            .iter()
            .map(|b| b["response_format"]["type"].as_str().unwrap_or("plain").to_owned())
            .collect()
    }

    /// `Authorization` header of each request
    pub fn authorization(&self) -> Vec<Option<String>> {
        self.state.authorization.lock().unwrap().clone()
    }
}

impl Drop for MockOpenRouter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Wire types matching the OpenRouter response format --

#[derive(Debug, Serialize)]
struct ChatCompletionResponse {
    id: String,
    object: String,
    created: u64,
    model: String,
    choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<Usage>,
}

#[derive(Debug, Serialize)]
struct Choice {
    index: u32,
    message: ResponseMessage,
    finish_reason: String,
}

#[derive(Debug, Serialize)]
struct ResponseMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
    cost: f64,
}

// -- Handlers --

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": {
                "message": message,
                "code": status.as_u16()
            }
        })),
    )
        .into_response()
}

async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    state.bodies.lock().unwrap().push(body.clone());
    state.authorization.lock().unwrap().push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned),
    );

    let remaining = state.fail_count.load(Ordering::Relaxed);
    if remaining > 0 {
        state.fail_count.fetch_sub(1, Ordering::Relaxed);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "mock server intentional failure");
    }

    let options = &state.options;
    match body["response_format"]["type"].as_str() {
        Some("json_schema") if options.reject_json_schema => {
            return error_response(StatusCode::BAD_REQUEST, "json_schema response format is not supported");
        }
        Some("json_object") if options.reject_json_object => {
            return error_response(StatusCode::BAD_REQUEST, "json_object response format is not supported");
        }
        _ => {}
    }

    let response = ChatCompletionResponse {
        id: "gen-test-123".to_owned(),
        object: "chat.completion".to_owned(),
        created: 1_700_000_000,
        model: body["model"].as_str().unwrap_or_default().to_owned(),
        choices: vec![Choice {
            index: 0,
            message: ResponseMessage {
                role: "assistant".to_owned(),
                content: options.content.clone(),
            },
            finish_reason: options.finish_reason.clone(),
        }],
        usage: options.include_usage.then_some(Usage {
            prompt_tokens: 42,
            completion_tokens: 17,
            total_tokens: 59,
            cost: options.cost,
        }),
    };

    Json(response).into_response()
}
