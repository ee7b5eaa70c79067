use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, Sse},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::server::state::AppState;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Queue depth endpoint
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    match state.router.status().await {
        Ok(status) => Json(status).into_response(),
        Err(_) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

/// Command endpoint: one JSON request in, one JSON reply out.
///
/// Protocol errors (undefined command, syntax error, ...) are ordinary
/// replies with HTTP 200; the transport only fails when the router loop
/// itself is gone.
pub async fn api(State(state): State<AppState>, Json(request): Json<Value>) -> impl IntoResponse {
    match state.router.request(request).await {
        Ok(reply) => Json(reply).into_response(),
        Err(_) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

/// Broadcast endpoint: each lifecycle message becomes one SSE data frame.
/// Subscribers filter on message prefixes (`new job`, `job finished: <id>`).
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.router.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(message) => yield Ok(Event::default().data(message)),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    // Best-effort delivery: a slow subscriber just loses
                    // messages, it does not stall the feed.
                    debug!("Event subscriber lagged, skipped {} messages", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream)
}

/// Create the Axum router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/api", post(api))
        .route("/events", get(events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
