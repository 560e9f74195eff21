use super::models::{
    Comment, Like, NewUser, NewVideo, Playlist, Subscription, Tweet, User, UserProfile, Video,
    VideoSummary,
};
use crate::engagement::{ChannelStats, LikeKey, RelationInsert, SubscriptionKey};
use crate::user::auth::{AuthToken, AuthTokenValue, PasswordCredentials};
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns the user id, or Ok(None) when the
    /// username or email is already taken. The unique constraints make this
    /// safe against a duplicate slipping in between a pre-check and the insert.
    fn create_user(&self, new_user: &NewUser) -> Result<Option<usize>>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    /// Looks a user up by username or email, whichever matches.
    fn find_user_by_login(&self, login: &str) -> Result<Option<User>>;

    fn username_exists(&self, username: &str) -> Result<bool>;

    fn email_exists(&self, email: &str) -> Result<bool>;

    /// Replaces the single-slot refresh token. `None` clears the slot.
    fn set_refresh_token(&self, user_id: usize, token: Option<&str>) -> Result<()>;

    fn find_user_by_refresh_token(&self, token: &str) -> Result<Option<User>>;

    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>>;

    /// Creates or replaces the user's password credentials.
    fn set_password_credentials(&self, credentials: &PasswordCredentials) -> Result<()>;
}

pub trait AuthTokenStore: Send + Sync {
    fn add_auth_token(&self, token: &AuthToken) -> Result<()>;

    /// Returns Ok(None) for unknown or expired tokens; expired rows are pruned
    /// lazily on lookup.
    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>>;

    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes every access token of a user (logout-everywhere, token refresh).
    fn delete_user_auth_tokens(&self, user_id: usize) -> Result<usize>;
}

pub trait WatchHistoryStore: Send + Sync {
    /// Records a watch; re-watching moves the video to the front of the history.
    fn record_watch(&self, user_id: usize, video_id: &str) -> Result<()>;

    /// Most-recent-first watch history, offset-paginated.
    fn get_watch_history(&self, user_id: usize, page: usize, page_size: usize)
        -> Result<Vec<Video>>;
}

pub trait VideoStore: Send + Sync {
    fn insert_video(&self, new_video: &NewVideo) -> Result<Video>;

    fn get_video(&self, video_id: &str) -> Result<Option<Video>>;

    /// Published videos, newest-first, optionally filtered by a case-insensitive
    /// substring match over title and description. Offset pagination.
    fn list_videos(
        &self,
        text_filter: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Video>>;

    fn update_video(&self, video_id: &str, title: &str, description: &str) -> Result<Option<Video>>;

    /// Removes the video row together with its comments, its likes (including
    /// likes of those comments) and its playlist memberships, in one transaction.
    fn delete_video(&self, video_id: &str) -> Result<bool>;

    fn set_video_published(&self, video_id: &str, published: bool) -> Result<Option<Video>>;

    fn increment_video_views(&self, video_id: &str) -> Result<()>;
}

pub trait CommentStore: Send + Sync {
    fn insert_comment(&self, video_id: &str, owner_id: usize, content: &str) -> Result<Comment>;

    fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>>;

    /// Comments of a video, oldest first.
    fn comments_for_video(&self, video_id: &str) -> Result<Vec<Comment>>;

    fn update_comment(&self, comment_id: &str, content: &str) -> Result<Option<Comment>>;

    fn delete_comment(&self, comment_id: &str) -> Result<bool>;
}

pub trait TweetStore: Send + Sync {
    fn insert_tweet(&self, owner_id: usize, content: &str) -> Result<Tweet>;

    fn get_tweet(&self, tweet_id: &str) -> Result<Option<Tweet>>;

    /// A user's tweets, newest first.
    fn tweets_by_owner(&self, owner_id: usize) -> Result<Vec<Tweet>>;

    fn update_tweet(&self, tweet_id: &str, content: &str) -> Result<Option<Tweet>>;

    fn delete_tweet(&self, tweet_id: &str) -> Result<bool>;

    /// Case-insensitive substring search over tweet content, newest first,
    /// offset-paginated. No matches is an empty page, not an error.
    fn search_tweets(&self, text: &str, page: usize, page_size: usize) -> Result<Vec<Tweet>>;
}

/// Relation-row operations consumed by the toggle engine.
pub trait EngagementStore: Send + Sync {
    fn find_like(&self, key: &LikeKey) -> Result<Option<Like>>;

    /// Inserting an existing (target, user) pair reports `AlreadyExists` via
    /// the unique constraint instead of failing.
    fn insert_like(&self, key: &LikeKey) -> Result<RelationInsert<Like>>;

    fn delete_like(&self, key: &LikeKey) -> Result<bool>;

    /// Videos the user has liked, most recently liked first.
    fn liked_videos(&self, user_id: usize) -> Result<Vec<Video>>;

    fn find_subscription(&self, key: &SubscriptionKey) -> Result<Option<Subscription>>;

    fn insert_subscription(&self, key: &SubscriptionKey) -> Result<RelationInsert<Subscription>>;

    fn delete_subscription(&self, key: &SubscriptionKey) -> Result<bool>;

    fn channel_subscribers(&self, channel_id: usize) -> Result<Vec<UserProfile>>;

    fn subscribed_channels(&self, subscriber_id: usize) -> Result<Vec<UserProfile>>;
}

/// Read-time rollups; see the stats engine for the underlying queries.
pub trait StatsStore: Send + Sync {
    fn channel_stats(&self, channel_id: usize) -> Result<ChannelStats>;

    /// Unpublished videos are included only when `include_unpublished` is set;
    /// callers set it for the channel owner and nobody else.
    fn channel_videos(
        &self,
        channel_id: usize,
        include_unpublished: bool,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<VideoSummary>>;

    fn video_like_count(&self, video_id: &str) -> Result<u64>;
}

pub trait PlaylistStore: Send + Sync {
    fn create_playlist(&self, owner_id: usize, name: &str, description: &str) -> Result<Playlist>;

    fn get_playlist(&self, playlist_id: &str) -> Result<Option<Playlist>>;

    fn playlists_by_owner(&self, owner_id: usize) -> Result<Vec<Playlist>>;

    fn update_playlist(
        &self,
        playlist_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Playlist>>;

    fn delete_playlist(&self, playlist_id: &str) -> Result<bool>;

    /// Appends a video; duplicates are rejected by the unique constraint and
    /// reported as Ok(false).
    fn add_playlist_video(&self, playlist_id: &str, video_id: &str) -> Result<bool>;

    fn remove_playlist_video(&self, playlist_id: &str, video_id: &str) -> Result<bool>;
}

pub trait FullStore:
    UserStore
    + AuthTokenStore
    + WatchHistoryStore
    + VideoStore
    + CommentStore
    + TweetStore
    + EngagementStore
    + StatsStore
    + PlaylistStore
{
}

impl<T> FullStore for T where
    T: UserStore
        + AuthTokenStore
        + WatchHistoryStore
        + VideoStore
        + CommentStore
        + TweetStore
        + EngagementStore
        + StatsStore
        + PlaylistStore
{
}
