//! HTTP surface: the chat-completion dispatcher and the OAuth callback.
//!
//! Every path other than `/oauth/callback` is treated as a chat request and
//! answered with a single server-sent-event frame.

mod chat;
mod server;
mod state;

pub use chat::{ChatCompletionChunk, PING_REPLY, TOKEN_HEADER, reply_content, trigger_handle};
pub use server::{build_router, start_http_server};
pub use state::ApiState;
