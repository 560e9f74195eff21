//! Video publishing and playback metadata.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{ApiError, ApiResult};
use super::pagination::PageQuery;
use super::response::ApiResponse;
use super::session::Session;
use super::state::{GuardedStore, ServerState};
use crate::blob::BlobKind;
use crate::store::models::{NewVideo, Video};

const MAX_VIDEO_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct VideoListQuery {
    text: Option<String>,
    #[serde(flatten)]
    page: PageQuery,
}

#[derive(Debug, Deserialize)]
struct UpdateVideoBody {
    title: Option<String>,
    description: Option<String>,
}

/// A video together with its read-time like rollup.
#[derive(Serialize)]
struct VideoWithLikes {
    #[serde(flatten)]
    video: Video,
    likes: u64,
}

/// Loads a video and checks the session owns it.
fn owned_video(store: &GuardedStore, session: &Session, video_id: &str) -> ApiResult<Video> {
    let video = store
        .get_video(video_id)?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    if video.owner_id != session.user_id {
        return Err(ApiError::Forbidden(
            "Only the owner can modify a video".to_string(),
        ));
    }
    Ok(video)
}

async fn publish_video(
    State(state): State<ServerState>,
    session: Session,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<Video>> {
    let mut title: Option<String> = None;
    let mut description = String::new();
    let mut video_bytes: Option<Vec<u8>> = None;
    let mut thumbnail_bytes: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::Validation("Failed to read multipart field".to_string()))?;
        match field_name.as_str() {
            "title" => title = Some(String::from_utf8_lossy(&bytes).trim().to_string()),
            "description" => description = String::from_utf8_lossy(&bytes).trim().to_string(),
            "video" => video_bytes = Some(bytes.to_vec()),
            "thumbnail" => thumbnail_bytes = Some(bytes.to_vec()),
            _ => {}
        }
    }

    let title = match title {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::Validation("title is required".to_string())),
    };
    let video_bytes = match video_bytes {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::Validation("video file is required".to_string())),
    };
    let thumbnail_bytes = match thumbnail_bytes {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::Validation("thumbnail is required".to_string())),
    };

    let video_blob = state
        .blobs
        .store(BlobKind::Video, &video_bytes)
        .map_err(|err| ApiError::Validation(err.to_string()))?;
    let thumbnail_blob = match state.blobs.store(BlobKind::Image, &thumbnail_bytes) {
        Ok(blob) => blob,
        Err(err) => {
            // Orphaned video blob would never be referenced, drop it now.
            if let Err(del_err) = state.blobs.delete(&video_blob.url) {
                warn!("Failed to clean up video blob: {}", del_err);
            }
            return Err(ApiError::Validation(err.to_string()));
        }
    };

    let video = state.store.insert_video(&NewVideo {
        owner_id: session.user_id,
        title,
        description,
        video_url: video_blob.url,
        thumbnail_url: thumbnail_blob.url,
        duration_seconds: video_blob.duration_seconds.unwrap_or(0.0),
    })?;
    info!("User {} published video {}", session.user_id, video.id);
    Ok(ApiResponse::created("Video published", video))
}

async fn list_videos(
    State(store): State<GuardedStore>,
    Query(query): Query<VideoListQuery>,
) -> ApiResult<ApiResponse<Vec<Video>>> {
    let (page, limit) = query.page.clamped();
    let text = query.text.as_deref().filter(|t| !t.is_empty());
    let videos = store.list_videos(text, page, limit)?;
    Ok(ApiResponse::ok("Videos", videos))
}

async fn get_video(
    State(store): State<GuardedStore>,
    session: Option<Session>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<VideoWithLikes>> {
    let video = store
        .get_video(&video_id)?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    let viewer_id = session.as_ref().map(|s| s.user_id);
    // Unpublished videos are visible to their owner only.
    if !video.published && viewer_id != Some(video.owner_id) {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }

    store.increment_video_views(&video_id)?;
    if let Some(viewer_id) = viewer_id {
        store.record_watch(viewer_id, &video_id)?;
    }

    let likes = store.video_like_count(&video_id)?;
    let video = store
        .get_video(&video_id)?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    Ok(ApiResponse::ok("Video", VideoWithLikes { video, likes }))
}

async fn update_video(
    State(store): State<GuardedStore>,
    session: Session,
    Path(video_id): Path<String>,
    Json(body): Json<UpdateVideoBody>,
) -> ApiResult<ApiResponse<Video>> {
    let video = owned_video(&store, &session, &video_id)?;
    let title = body.title.filter(|t| !t.is_empty()).unwrap_or(video.title);
    let description = body.description.unwrap_or(video.description);
    let updated = store
        .update_video(&video_id, &title, &description)?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    Ok(ApiResponse::ok("Video updated", updated))
}

async fn delete_video(
    State(state): State<ServerState>,
    session: Session,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let video = owned_video(&state.store, &session, &video_id)?;

    // Blobs first: a re-run after a partial failure still finds the row.
    state.blobs.delete(&video.video_url)?;
    state.blobs.delete(&video.thumbnail_url)?;
    state.store.delete_video(&video_id)?;

    debug!("User {} deleted video {}", session.user_id, video_id);
    Ok(ApiResponse::ok("Video deleted", ()))
}

async fn toggle_publish(
    State(store): State<GuardedStore>,
    session: Session,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Video>> {
    let video = owned_video(&store, &session, &video_id)?;
    let updated = store
        .set_video_published(&video_id, !video.published)?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    Ok(ApiResponse::ok("Publish state toggled", updated))
}

pub fn video_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_videos).post(publish_video))
        .route(
            "/{id}",
            get(get_video).patch(update_video).delete(delete_video),
        )
        .route("/{id}/toggle-publish", patch(toggle_publish))
        .layer(DefaultBodyLimit::max(MAX_VIDEO_UPLOAD_BYTES))
}
