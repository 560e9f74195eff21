use anyhow::Result;
use std::time::{Duration, Instant};

use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::comment_routes::comment_routes;
use super::dashboard_routes::dashboard_routes;
use super::like_routes::like_routes;
use super::metrics::{init_metrics, metrics_handler};
use super::playlist_routes::playlist_routes;
use super::session::Session;
use super::state::{GuardedBlobStore, GuardedStore, ServerState};
use super::subscription_routes::subscription_routes;
use super::tweet_routes::tweet_routes;
use super::user_routes::user_routes;
use super::video_routes::video_routes;
use super::{log_requests, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub authenticated: bool,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        authenticated: session.is_some(),
    };
    Json(stats)
}

pub fn make_app(
    config: ServerConfig,
    store: GuardedStore,
    blobs: GuardedBlobStore,
) -> Result<Router> {
    init_metrics();

    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        store,
        blobs,
        hash: env!("GIT_HASH").to_owned(),
    };

    let api_routes: Router<ServerState> = Router::new()
        .nest("/users", user_routes())
        .nest("/videos", video_routes())
        .nest("/comments", comment_routes())
        .nest("/likes", like_routes())
        .nest("/subscriptions", subscription_routes())
        .nest("/tweets", tweet_routes())
        .nest("/playlists", playlist_routes())
        .nest("/dashboard", dashboard_routes());

    let app = Router::new()
        .route("/", get(home))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api_routes)
        .nest_service("/media", ServeDir::new(&config.media_dir))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    store: GuardedStore,
    blobs: GuardedBlobStore,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, store, blobs)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
