//! adiwiyata-server
//!
//! HTTP surface of the Adiwiyata site: the page, the live comment board and
//! AdiBot chat sessions.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod sessions;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_mw;
use axum::routing::{get, post, put};
use tower_http::services::ServeDir;

use routes::page::ASSETS_PREFIX;
use state::AppState;

pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.assets_dir);
    let attachment_limit = DefaultBodyLimit::max(state.max_attachment_bytes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/", get(routes::page::index))
        // Comment board
        .route(
            "/comments",
            get(routes::comments::list_comments).post(routes::comments::submit_comment),
        )
        .route("/comments/fragment", get(routes::comments::comments_fragment))
        .route("/comments/stream", get(routes::comments::comments_stream))
        // AdiBot sessions
        .route("/chat/sessions", post(routes::chat::create_session))
        .route(
            "/chat/sessions/{id}",
            get(routes::chat::get_session).delete(routes::chat::delete_session),
        )
        .route(
            "/chat/sessions/{id}/fragment",
            get(routes::chat::messages_fragment),
        )
        .route(
            "/chat/sessions/{id}/stream",
            get(routes::chat::messages_stream),
        )
        .route(
            "/chat/sessions/{id}/attachment",
            put(routes::chat::put_attachment)
                .delete(routes::chat::clear_attachment)
                .layer(attachment_limit),
        )
        .route(
            "/chat/sessions/{id}/messages",
            post(routes::chat::send_message),
        )
        .nest_service(ASSETS_PREFIX, assets)
        .layer(axum_mw::from_fn(middleware::trace::request_log))
        .with_state(state)
}
