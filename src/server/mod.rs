mod comment_routes;
pub mod config;
mod dashboard_routes;
pub mod error;
mod http_layers;
mod like_routes;
pub mod metrics;
mod pagination;
mod playlist_routes;
pub mod response;
pub mod server;
mod session;
pub mod state;
mod subscription_routes;
mod tweet_routes;
mod user_routes;
mod video_routes;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use http_layers::*;
pub use response::ApiResponse;
pub use server::{make_app, run_server};
pub use state::{GuardedBlobStore, GuardedStore, ServerState};
