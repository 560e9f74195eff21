//! The two core engines: toggle-state flips and read-time rollups.

pub mod stats;
pub mod toggle;

pub use stats::{channel_stats, channel_videos, video_like_count, ChannelStats, Rollup};
pub use toggle::{
    toggle, LikeKey, LikeRelation, RelationInsert, SubscriptionKey, SubscriptionRelation,
    ToggleOutcome, ToggleRelation,
};
