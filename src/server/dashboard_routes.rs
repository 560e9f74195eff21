//! Channel dashboard: read-time rollups, never stored counters.
//! Both endpoints require a session.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};

use super::error::ApiResult;
use super::pagination::PageQuery;
use super::response::ApiResponse;
use super::session::Session;
use super::state::{GuardedStore, ServerState};
use crate::engagement::ChannelStats;
use crate::store::models::VideoSummary;

/// Unknown channels roll up to all zeros, deliberately not a 404: a channel
/// with no content and a channel that does not exist are indistinguishable
/// to the rollup queries.
async fn channel_stats(
    State(store): State<GuardedStore>,
    _session: Session,
    Path(channel_id): Path<usize>,
) -> ApiResult<ApiResponse<ChannelStats>> {
    let stats = store.channel_stats(channel_id)?;
    Ok(ApiResponse::ok("Channel stats", stats))
}

/// Drafts show up only in the owner's own listing.
async fn channel_videos(
    State(store): State<GuardedStore>,
    session: Session,
    Path(channel_id): Path<usize>,
    Query(page): Query<PageQuery>,
) -> ApiResult<ApiResponse<Vec<VideoSummary>>> {
    let (page, limit) = page.clamped();
    let include_unpublished = session.user_id == channel_id;
    let videos = store.channel_videos(channel_id, include_unpublished, page, limit)?;
    Ok(ApiResponse::ok("Channel videos", videos))
}

pub fn dashboard_routes() -> Router<ServerState> {
    Router::new()
        .route("/stats/{channelId}", get(channel_stats))
        .route("/videos/{channelId}", get(channel_videos))
}
