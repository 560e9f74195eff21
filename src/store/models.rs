//! Persisted document models and response projections

use serde::{Deserialize, Serialize};

/// Full user row, including credential material. Never serialized to clients
/// directly, use [`UserProfile`] for that.
#[derive(Debug, Clone)]
pub struct User {
    pub id: usize,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    /// Single-slot refresh token. Issuing a new one invalidates the prior session.
    pub refresh_token: Option<String>,
    pub created: i64,
}

/// The client-facing projection of a user. No password hash, no refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: usize,
    pub username: String,
    pub fullname: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username.clone(),
            fullname: user.fullname.clone(),
            avatar_url: user.avatar_url.clone(),
            cover_image_url: user.cover_image_url.clone(),
        }
    }
}

/// Input for user creation, assembled by the register controller after
/// validation and blob uploads.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Video {
    pub id: String,
    pub owner_id: usize,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
    pub views: u64,
    pub published: bool,
    pub created: i64,
}

/// Projection used by channel listings, the dashboard and search results.
#[derive(Debug, Clone, Serialize)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub views: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: String,
    pub video_id: String,
    pub owner_id: usize,
    pub content: String,
    pub created: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tweet {
    pub id: String,
    pub owner_id: usize,
    pub content: String,
    pub created: i64,
}

/// Input for video creation, assembled after both blob uploads succeeded.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub owner_id: usize,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
}

/// Discriminated like target: exactly one entity kind per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeTargetKind {
    Video,
    Comment,
    Tweet,
}

impl LikeTargetKind {
    pub fn to_int(&self) -> i32 {
        match self {
            LikeTargetKind::Video => 1,
            LikeTargetKind::Comment => 2,
            LikeTargetKind::Tweet => 3,
        }
    }

    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            1 => Some(LikeTargetKind::Video),
            2 => Some(LikeTargetKind::Comment),
            3 => Some(LikeTargetKind::Tweet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Like {
    pub id: usize,
    pub target_kind: LikeTargetKind,
    pub target_id: String,
    pub user_id: usize,
    pub created: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub id: usize,
    pub channel_id: usize,
    pub subscriber_id: usize,
    pub created: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Playlist {
    pub id: String,
    pub owner_id: usize,
    pub name: String,
    pub description: String,
    pub created: i64,
    /// Ordered video ids, duplicates disallowed.
    pub videos: Vec<String>,
}
