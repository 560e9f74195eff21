//! Channel subscription toggle and membership listings.

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
use crate::engagement::{toggle, SubscriptionKey, ToggleOutcome};
use crate::store::models::{Subscription, UserProfile};

fn require_user(store: &GuardedStore, user_id: usize) -> ApiResult<()> {
    store
        .get_user(user_id)?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Channel not found".to_string()))
}

async fn toggle_subscription(
    State(store): State<GuardedStore>,
    session: Session,
    Path(channel_id): Path<usize>,
) -> ApiResult<ApiResponse<ToggleOutcome<Subscription>>> {
    if channel_id == session.user_id {
        return Err(ApiError::Validation(
            "Cannot subscribe to your own channel".to_string(),
        ));
    }
    require_user(&store, channel_id)?;

    let key = SubscriptionKey {
        channel_id,
        subscriber_id: session.user_id,
    };
    let outcome = toggle(&key.on_store(store.as_ref()))?;
    let outcome_label = match &outcome {
        ToggleOutcome::Created(_) => "created",
        ToggleOutcome::Removed => "removed",
    };
    record_toggle("subscription", outcome_label);
    debug!(
        "User {} toggled subscription to channel {} -> {}",
        session.user_id, channel_id, outcome_label
    );
    Ok(ApiResponse::ok("Subscription toggled", outcome))
}

async fn channel_subscribers(
    State(store): State<GuardedStore>,
    Path(channel_id): Path<usize>,
) -> ApiResult<ApiResponse<Vec<UserProfile>>> {
    require_user(&store, channel_id)?;
    let subscribers = store.channel_subscribers(channel_id)?;
    Ok(ApiResponse::ok("Subscribers", subscribers))
}

async fn subscribed_channels(
    State(store): State<GuardedStore>,
    Path(subscriber_id): Path<usize>,
) -> ApiResult<ApiResponse<Vec<UserProfile>>> {
    require_user(&store, subscriber_id)?;
    let channels = store.subscribed_channels(subscriber_id)?;
    Ok(ApiResponse::ok("Subscribed channels", channels))
}

pub fn subscription_routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/c/{channelId}",
            post(toggle_subscription).get(channel_subscribers),
        )
        .route("/u/{subscriberId}", get(subscribed_channels))
}
