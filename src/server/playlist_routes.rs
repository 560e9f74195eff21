use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::response::ApiResponse;
use super::session::Session;
use super::state::{GuardedStore, ServerState};
use crate::store::models::Playlist;

#[derive(Debug, Deserialize)]
struct CreatePlaylistBody {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct UpdatePlaylistBody {
    name: Option<String>,
    description: Option<String>,
}

fn owned_playlist(
    store: &GuardedStore,
    session: &Session,
    playlist_id: &str,
) -> ApiResult<Playlist> {
    let playlist = store
        .get_playlist(playlist_id)?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))?;
    if playlist.owner_id != session.user_id {
        return Err(ApiError::Forbidden(
            "Only the owner can modify a playlist".to_string(),
        ));
    }
    Ok(playlist)
}

async fn create_playlist(
    State(store): State<GuardedStore>,
    session: Session,
    Json(body): Json<CreatePlaylistBody>,
) -> ApiResult<ApiResponse<Playlist>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    let playlist = store.create_playlist(session.user_id, name, body.description.trim())?;
    Ok(ApiResponse::created("Playlist created", playlist))
}

async fn user_playlists(
    State(store): State<GuardedStore>,
    Path(user_id): Path<usize>,
) -> ApiResult<ApiResponse<Vec<Playlist>>> {
    store
        .get_user(user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let playlists = store.playlists_by_owner(user_id)?;
    Ok(ApiResponse::ok("Playlists", playlists))
}

async fn get_playlist(
    State(store): State<GuardedStore>,
    Path(playlist_id): Path<String>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist = store
        .get_playlist(&playlist_id)?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))?;
    Ok(ApiResponse::ok("Playlist", playlist))
}

async fn update_playlist(
    State(store): State<GuardedStore>,
    session: Session,
    Path(playlist_id): Path<String>,
    Json(body): Json<UpdatePlaylistBody>,
) -> ApiResult<ApiResponse<Playlist>> {
    owned_playlist(&store, &session, &playlist_id)?;
    let name = body.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let description = body.description.as_deref().map(str::trim);
    let updated = store
        .update_playlist(&playlist_id, name, description)?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))?;
    Ok(ApiResponse::ok("Playlist updated", updated))
}

async fn delete_playlist(
    State(store): State<GuardedStore>,
    session: Session,
    Path(playlist_id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    owned_playlist(&store, &session, &playlist_id)?;
    store.delete_playlist(&playlist_id)?;
    Ok(ApiResponse::ok("Playlist deleted", ()))
}

async fn add_video(
    State(store): State<GuardedStore>,
    session: Session,
    Path((playlist_id, video_id)): Path<(String, String)>,
) -> ApiResult<ApiResponse<Playlist>> {
    owned_playlist(&store, &session, &playlist_id)?;
    store
        .get_video(&video_id)?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    if !store.add_playlist_video(&playlist_id, &video_id)? {
        return Err(ApiError::Conflict(
            "Video is already in the playlist".to_string(),
        ));
    }
    let playlist = store
        .get_playlist(&playlist_id)?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))?;
    Ok(ApiResponse::ok("Video added to playlist", playlist))
}

async fn remove_video(
    State(store): State<GuardedStore>,
    session: Session,
    Path((playlist_id, video_id)): Path<(String, String)>,
) -> ApiResult<ApiResponse<Playlist>> {
    owned_playlist(&store, &session, &playlist_id)?;
    if !store.remove_playlist_video(&playlist_id, &video_id)? {
        return Err(ApiError::NotFound(
            "Video is not in the playlist".to_string(),
        ));
    }
    let playlist = store
        .get_playlist(&playlist_id)?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))?;
    Ok(ApiResponse::ok("Video removed from playlist", playlist))
}

pub fn playlist_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(create_playlist))
        .route("/user/{userId}", get(user_playlists))
        .route(
            "/{id}",
            get(get_playlist)
                .patch(update_playlist)
                .delete(delete_playlist),
        )
        .route(
            "/{id}/videos/{videoId}",
            patch(add_video).delete(remove_video),
        )
}
