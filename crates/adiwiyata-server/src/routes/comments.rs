use std::convert::Infallible;

use adiwiyata_board::comments::SubmitOutcome;
use adiwiyata_site::render::{CommentView, Renderer};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt, future};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::WatchStream;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitCommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitCommentResponse {
    pub status: SubmitOutcome,
}

pub async fn list_comments(State(state): State<AppState>) -> Json<Vec<CommentView>> {
    Json(state.comment_views())
}

pub async fn comments_fragment(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let html = state.renderer.render_comments(&state.comment_views())?;
    Ok(Html(html))
}

/// Accepts the comment for writing. It shows up once the store confirms it
/// through the live snapshot.
pub async fn submit_comment(
    State(state): State<AppState>,
    Json(req): Json<SubmitCommentRequest>,
) -> (StatusCode, Json<SubmitCommentResponse>) {
    let status = state.board.submit(&req.text);
    (StatusCode::ACCEPTED, Json(SubmitCommentResponse { status }))
}

/// Rendered comment list on connect and after every board change.
pub async fn comments_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let renderer = state.renderer.clone();
    let clock = state.clock.clone();

    let stream = WatchStream::new(state.board.watch()).filter_map(move |board| {
        let now = clock.now();
        let views: Vec<CommentView> = board
            .comments
            .iter()
            .map(|record| CommentView::new(record, now))
            .collect();
        future::ready(render_event(&renderer, &views))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn render_event(renderer: &Renderer, views: &[CommentView]) -> Option<Result<Event, Infallible>> {
    match renderer.render_comments(views) {
        Ok(html) => Some(Ok(Event::default().event("comments").data(html))),
        Err(e) => {
            tracing::error!(error = %e, "comment fragment render failed");
            None
        }
    }
}
