//! Chat-completion dispatcher.
//!
//! Authenticates the request, picks the handle out of the latest message and
//! answers with exactly one `chat.completion.chunk` frame.

use super::state::ApiState;
use crate::error::LookupError;
use crate::profile::{GitHubClient, resolve_profile};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use std::sync::Arc;

/// Header carrying the caller's bearer credential.
pub const TOKEN_HEADER: &str = "x-github-token";

/// Reply sent for any message mentioning "ping".
pub const PING_REPLY: &str = "pong";

const COMPLETION_ID: &str = "copilot-no-llm";
const CHUNK_OBJECT: &str = "chat.completion.chunk";

#[derive(Debug, Deserialize)]
pub(super) struct ChatRequest {
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    content: String,
}

/// SSE chunk envelope carrying a single delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatCompletionChunk {
    id: &'static str,
    object: &'static str,
    /// Creation time in Unix milliseconds.
    created: i64,
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ChunkDelta {
    content: Option<String>,
}

impl ChatCompletionChunk {
    pub fn new(content: Option<String>) -> Self {
        Self {
            id: COMPLETION_ID,
            object: CHUNK_OBJECT,
            created: chrono::Utc::now().timestamp_millis(),
            choices: vec![ChunkChoice {
                delta: ChunkDelta { content },
            }],
        }
    }

    /// Serialize as one `data: <json>\n\n` event.
    pub fn to_sse_frame(&self) -> serde_json::Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("data: {json}\n\n"))
    }
}

/// The first whitespace-delimited token of a message.
pub fn trigger_handle(content: &str) -> &str {
    content.split_whitespace().next().unwrap_or("")
}

fn is_ping(content: &str) -> bool {
    content.to_lowercase().contains("ping")
}

/// Compute the reply for the latest message.
///
/// The profile lookup always runs, including for "ping" messages where its
/// result is thrown away and the reply is [`PING_REPLY`].
pub async fn reply_content(
    client: &GitHubClient,
    content: &str,
    token: &str,
) -> Result<String, LookupError> {
    let resolved = resolve_profile(client, trigger_handle(content), token).await;

    if is_ping(content) {
        if let Err(error) = &resolved {
            tracing::warn!(%error, "profile lookup failed on ping, reply unaffected");
        }
        return Ok(PING_REPLY.into());
    }

    resolved
}

fn github_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

fn sse_response(chunk: &ChatCompletionChunk) -> Response {
    match chunk.to_sse_frame() {
        Ok(frame) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/event-stream")],
            frame,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, "failed to serialize completion chunk");
            internal_error()
        }
    }
}

/// Fallback handler: every request that is not the OAuth callback.
pub(super) async fn chat_completion(
    State(state): State<Arc<ApiState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    tracing::debug!(path = %uri.path(), "received request");

    let Some(token) = github_token(&headers) else {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    };

    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            tracing::warn!(%error, "invalid chat request body");
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    let Some(message) = request.messages.last() else {
        tracing::warn!("chat request has no messages");
        return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
    };

    tracing::debug!(
        role = %message.role,
        name = ?message.name,
        messages = request.messages.len(),
        "dispatching latest message"
    );

    match reply_content(&state.github, &message.content, token).await {
        Ok(content) => sse_response(&ChatCompletionChunk::new(Some(content))),
        Err(error) => {
            tracing::error!(%error, "profile lookup failed");
            internal_error()
        }
    }
}
