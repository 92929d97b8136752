//! HTTP server setup: router, OAuth callback and server lifecycle.

use super::chat::chat_completion;
use super::state::ApiState;

use axum::Router;
use axum::response::Json;
use axum::routing::any;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

/// Build the application router.
///
/// `/oauth/callback` is acknowledged for any method without authentication;
/// everything else falls through to the chat dispatcher.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/oauth/callback", any(oauth_callback))
        .fallback(chat_completion)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the given address.
///
/// The server stops accepting connections once `shutdown_rx` flips to true.
pub async fn start_http_server(
    bind: SocketAddr,
    state: Arc<ApiState>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|error| anyhow::anyhow!("failed to bind HTTP server to {}: {}", bind, error))?;
    tracing::info!(%bind, "HTTP server listening");

    let handle = tokio::spawn(async move {
        let mut shutdown = shutdown_rx;
        if let Err(error) = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|v| *v).await;
            })
            .await
        {
            tracing::error!(%error, "HTTP server exited with error");
        }
    });

    Ok(handle)
}

async fn oauth_callback() -> Json<OkResponse> {
    tracing::debug!("received oauth callback");
    Json(OkResponse { ok: true })
}
