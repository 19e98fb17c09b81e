use adiwiyata_site::render::PageOptions;
use axum::extract::State;
use axum::response::Html;

use crate::error::ApiError;
use crate::state::AppState;

/// Prefix the asset directory is mounted under.
pub const ASSETS_PREFIX: &str = "/assets";

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let options = PageOptions {
        video_id: &state.video_id,
        assets_base: ASSETS_PREFIX,
    };
    let html = state.renderer.render_page(&options, &state.comment_views())?;
    Ok(Html(html))
}
