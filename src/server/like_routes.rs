//! Like toggles and the liked-videos listing.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::metrics::record_toggle;
use super::response::ApiResponse;
use super::session::Session;
use super::state::{GuardedStore, ServerState};
use crate::engagement::{toggle, LikeKey, ToggleOutcome};
use crate::store::models::{Like, LikeTargetKind, Video};

fn require_target(store: &GuardedStore, kind: LikeTargetKind, target_id: &str) -> ApiResult<()> {
    let found = match kind {
        LikeTargetKind::Video => store.get_video(target_id)?.is_some(),
        LikeTargetKind::Comment => store.get_comment(target_id)?.is_some(),
        LikeTargetKind::Tweet => store.get_tweet(target_id)?.is_some(),
    };
    if found {
        Ok(())
    } else {
        Err(ApiError::NotFound("Like target not found".to_string()))
    }
}

fn toggle_like(
    store: &GuardedStore,
    session: &Session,
    kind: LikeTargetKind,
    target_id: String,
) -> ApiResult<ApiResponse<ToggleOutcome<Like>>> {
    require_target(store, kind, &target_id)?;
    let key = LikeKey {
        target_kind: kind,
        target_id,
        user_id: session.user_id,
    };
    let outcome = toggle(&key.on_store(store.as_ref()))?;
    let outcome_label = match &outcome {
        ToggleOutcome::Created(_) => "created",
        ToggleOutcome::Removed => "removed",
    };
    record_toggle("like", outcome_label);
    debug!(
        "User {} toggled like on {:?} {} -> {}",
        session.user_id, key.target_kind, key.target_id, outcome_label
    );
    Ok(ApiResponse::ok("Like toggled", outcome))
}

async fn toggle_video_like(
    State(store): State<GuardedStore>,
    session: Session,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<ToggleOutcome<Like>>> {
    toggle_like(&store, &session, LikeTargetKind::Video, video_id)
}

async fn toggle_comment_like(
    State(store): State<GuardedStore>,
    session: Session,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<ToggleOutcome<Like>>> {
    toggle_like(&store, &session, LikeTargetKind::Comment, comment_id)
}

async fn toggle_tweet_like(
    State(store): State<GuardedStore>,
    session: Session,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<ToggleOutcome<Like>>> {
    toggle_like(&store, &session, LikeTargetKind::Tweet, tweet_id)
}

async fn liked_videos(
    State(store): State<GuardedStore>,
    session: Session,
) -> ApiResult<ApiResponse<Vec<Video>>> {
    let videos = store.liked_videos(session.user_id)?;
    Ok(ApiResponse::ok("Liked videos", videos))
}

pub fn like_routes() -> Router<ServerState> {
    Router::new()
        .route("/toggle/v/{id}", post(toggle_video_like))
        .route("/toggle/c/{id}", post(toggle_comment_like))
        .route("/toggle/t/{id}", post(toggle_tweet_like))
        .route("/videos", get(liked_videos))
}
