use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::response::ApiResponse;
use super::session::Session;
use super::state::{GuardedStore, ServerState};
use crate::store::models::Comment;

#[derive(Debug, Deserialize)]
struct CommentBody {
    content: String,
}

fn require_video(store: &GuardedStore, video_id: &str) -> ApiResult<()> {
    store
        .get_video(video_id)?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))
}

fn owned_comment(store: &GuardedStore, session: &Session, comment_id: &str) -> ApiResult<Comment> {
    let comment = store
        .get_comment(comment_id)?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    if comment.owner_id != session.user_id {
        return Err(ApiError::Forbidden(
            "Only the owner can modify a comment".to_string(),
        ));
    }
    Ok(comment)
}

async fn post_comment(
    State(store): State<GuardedStore>,
    session: Session,
    Path(video_id): Path<String>,
    Json(body): Json<CommentBody>,
) -> ApiResult<ApiResponse<Comment>> {
    if body.content.trim().is_empty() {
        return Err(ApiError::Validation("content is required".to_string()));
    }
    require_video(&store, &video_id)?;
    let comment = store.insert_comment(&video_id, session.user_id, body.content.trim())?;
    Ok(ApiResponse::created("Comment added", comment))
}

async fn list_comments(
    State(store): State<GuardedStore>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Comment>>> {
    require_video(&store, &video_id)?;
    let comments = store.comments_for_video(&video_id)?;
    Ok(ApiResponse::ok("Comments", comments))
}

async fn update_comment(
    State(store): State<GuardedStore>,
    session: Session,
    Path(comment_id): Path<String>,
    Json(body): Json<CommentBody>,
) -> ApiResult<ApiResponse<Comment>> {
    if body.content.trim().is_empty() {
        return Err(ApiError::Validation("content is required".to_string()));
    }
    owned_comment(&store, &session, &comment_id)?;
    let updated = store
        .update_comment(&comment_id, body.content.trim())?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    Ok(ApiResponse::ok("Comment updated", updated))
}

async fn delete_comment(
    State(store): State<GuardedStore>,
    session: Session,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    owned_comment(&store, &session, &comment_id)?;
    store.delete_comment(&comment_id)?;
    Ok(ApiResponse::ok("Comment deleted", ()))
}

pub fn comment_routes() -> Router<ServerState> {
    // GET/POST take a video id, PATCH/DELETE a comment id, on the same segment.
    Router::new().route(
        "/{id}",
        get(list_comments)
            .post(post_comment)
            .patch(update_comment)
            .delete(delete_comment),
    )
}
