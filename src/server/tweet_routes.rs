//! Short text posts and the public tweet search.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::pagination::PageQuery;
use super::response::ApiResponse;
use super::session::Session;
use super::state::{GuardedStore, ServerState};
use crate::store::models::Tweet;

#[derive(Debug, Deserialize)]
struct TweetBody {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TweetSearchQuery {
    #[serde(default)]
    text: String,
    #[serde(flatten)]
    page: PageQuery,
}

fn owned_tweet(store: &GuardedStore, session: &Session, tweet_id: &str) -> ApiResult<Tweet> {
    let tweet = store
        .get_tweet(tweet_id)?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))?;
    if tweet.owner_id != session.user_id {
        return Err(ApiError::Forbidden(
            "Only the owner can modify a tweet".to_string(),
        ));
    }
    Ok(tweet)
}

async fn post_tweet(
    State(store): State<GuardedStore>,
    session: Session,
    Json(body): Json<TweetBody>,
) -> ApiResult<ApiResponse<Tweet>> {
    if body.content.trim().is_empty() {
        return Err(ApiError::Validation("content is required".to_string()));
    }
    let tweet = store.insert_tweet(session.user_id, body.content.trim())?;
    Ok(ApiResponse::created("Tweet posted", tweet))
}

async fn my_tweets(
    State(store): State<GuardedStore>,
    session: Session,
) -> ApiResult<ApiResponse<Vec<Tweet>>> {
    let tweets = store.tweets_by_owner(session.user_id)?;
    Ok(ApiResponse::ok("Tweets", tweets))
}

async fn update_tweet(
    State(store): State<GuardedStore>,
    session: Session,
    Path(tweet_id): Path<String>,
    Json(body): Json<TweetBody>,
) -> ApiResult<ApiResponse<Tweet>> {
    if body.content.trim().is_empty() {
        return Err(ApiError::Validation("content is required".to_string()));
    }
    owned_tweet(&store, &session, &tweet_id)?;
    let updated = store
        .update_tweet(&tweet_id, body.content.trim())?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))?;
    Ok(ApiResponse::ok("Tweet updated", updated))
}

async fn delete_tweet(
    State(store): State<GuardedStore>,
    session: Session,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    owned_tweet(&store, &session, &tweet_id)?;
    store.delete_tweet(&tweet_id)?;
    Ok(ApiResponse::ok("Tweet deleted", ()))
}

/// Public search; no matches is an empty page, not an error.
async fn search_tweets(
    State(store): State<GuardedStore>,
    Query(query): Query<TweetSearchQuery>,
) -> ApiResult<ApiResponse<Vec<Tweet>>> {
    let (page, limit) = query.page.clamped();
    let tweets = store.search_tweets(query.text.trim(), page, limit)?;
    Ok(ApiResponse::ok("Search results", tweets))
}

pub fn tweet_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(my_tweets).post(post_tweet))
        .route("/search", get(search_tweets))
        .route("/{id}", axum::routing::patch(update_tweet).delete(delete_tweet))
}
