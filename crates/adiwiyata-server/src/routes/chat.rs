use std::convert::Infallible;
use std::sync::Arc;

use adiwiyata_board::chat::{ChatRelay, SendOutcome};
use adiwiyata_core::models::message::DisplayMessage;
use adiwiyata_site::render::Renderer;
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Html;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt, future};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub messages: Vec<DisplayMessage>,
    pub typing: bool,
    pub has_attachment: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    #[serde(flatten)]
    pub outcome: SendOutcome,
    pub messages: Vec<DisplayMessage>,
}

fn find_relay(state: &AppState, id: &Uuid) -> Result<Arc<ChatRelay>, ApiError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("chat session not found: {id}")))
}

pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let (id, _) = state
        .sessions
        .insert(state.new_relay())
        .ok_or_else(|| ApiError::Unavailable("too many open chat sessions".to_string()))?;
    Ok((StatusCode::CREATED, Json(SessionCreated { id })))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let relay = find_relay(&state, &id)?;
    let snapshot = relay.state();
    Ok(Json(SessionView {
        messages: snapshot.messages,
        typing: snapshot.typing,
        has_attachment: snapshot.pending_attachment.is_some(),
    }))
}

pub async fn messages_fragment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let relay = find_relay(&state, &id)?;
    let snapshot = relay.state();
    let html = state
        .renderer
        .render_messages(&snapshot.messages, snapshot.typing)?;
    Ok(Html(html))
}

/// Rendered message list on connect and after every relay change. Ends when
/// the session is closed.
pub async fn messages_stream(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let relay = find_relay(&state, &id)?;
    let renderer = state.renderer.clone();
    let open = Arc::clone(&relay);

    let stream = WatchStream::new(relay.watch())
        .take_while(move |_| future::ready(!open.is_closed()))
        .filter_map(move |_| future::ready(render_event(&renderer, &relay)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn render_event(renderer: &Renderer, relay: &ChatRelay) -> Option<Result<Event, Infallible>> {
    let snapshot = relay.state();
    match renderer.render_messages(&snapshot.messages, snapshot.typing) {
        Ok(html) => Some(Ok(Event::default().event("messages").data(html))),
        Err(e) => {
            tracing::error!(error = %e, "message fragment render failed");
            None
        }
    }
}

/// Hold the request body as the pending attachment. The media type comes
/// from `Content-Type`.
pub async fn put_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<StatusCode, ApiError> {
    let relay = find_relay(&state, &id)?;

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(format!(
                "attachment exceeds {} bytes",
                state.max_attachment_bytes
            ))
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })?;

    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing Content-Type".to_string()))?;

    relay.attach(&body, mime_type)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    find_relay(&state, &id)?.clear_attachment();
    Ok(StatusCode::NO_CONTENT)
}

/// Run one relay round. Responds once the reply (or the fallback) is in; a
/// client that disconnects first does not cancel the round.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let relay = find_relay(&state, &id)?;
    let outcome = relay.send(&req.text).await;
    Ok(Json(SendMessageResponse {
        outcome,
        messages: relay.messages(),
    }))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .remove(&id)
        .ok_or_else(|| ApiError::NotFound(format!("chat session not found: {id}")))?;
    Ok(StatusCode::NO_CONTENT)
}
