pub mod full_store;
pub mod models;
pub mod schema;
pub mod sqlite_store;

pub use full_store::{
    AuthTokenStore, CommentStore, EngagementStore, FullStore, PlaylistStore, StatsStore,
    TweetStore, UserStore, VideoStore, WatchHistoryStore,
};
pub use models::*;
pub use sqlite_store::SqliteStore;
