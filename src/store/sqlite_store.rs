use super::models::{
    Comment, Like, LikeTargetKind, NewUser, NewVideo, Playlist, Subscription, Tweet, User,
    UserProfile, Video, VideoSummary,
};
use super::schema::{
    AUTH_TOKEN_TABLE, COMMENT_TABLE, CONTENT_LIKE_TABLE, PLAYLIST_TABLE, PLAYLIST_VIDEO_TABLE,
    SCHEMA, SUBSCRIPTION_TABLE, TWEET_TABLE, USER_PASSWORD_CREDENTIALS_TABLE, USER_TABLE,
    VIDEO_TABLE, WATCH_HISTORY_TABLE,
};
use super::full_store::{
    AuthTokenStore, CommentStore, EngagementStore, PlaylistStore, StatsStore, TweetStore,
    UserStore, VideoStore, WatchHistoryStore,
};
use crate::engagement::{self, ChannelStats, LikeKey, RelationInsert, SubscriptionKey};
use crate::user::auth::{AuthToken, AuthTokenValue, PasswordCredentials, VidHubHasher};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use std::{
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex},
};

const VIDEO_COLUMNS: &str =
    "id, owner_id, title, description, video_url, thumbnail_url, duration, views, published, created";

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::ConstraintViolation,
                ..
            },
            _,
        )
    )
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        fullname: row.get(3)?,
        avatar_url: row.get(4)?,
        cover_image_url: row.get(5)?,
        refresh_token: row.get(6)?,
        created: row.get(7)?,
    })
}

fn video_from_row(row: &Row) -> rusqlite::Result<Video> {
    Ok(Video {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        video_url: row.get(4)?,
        thumbnail_url: row.get(5)?,
        duration_seconds: row.get(6)?,
        views: row.get::<usize, i64>(7)? as u64,
        published: row.get::<usize, i64>(8)? != 0,
        created: row.get(9)?,
    })
}

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        video_id: row.get(1)?,
        owner_id: row.get(2)?,
        content: row.get(3)?,
        created: row.get(4)?,
    })
}

fn tweet_from_row(row: &Row) -> rusqlite::Result<Tweet> {
    Ok(Tweet {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        content: row.get(2)?,
        created: row.get(3)?,
    })
}

fn like_from_row(row: &Row) -> rusqlite::Result<Like> {
    Ok(Like {
        id: row.get(0)?,
        target_kind: LikeTargetKind::from_int(row.get(1)?).ok_or(rusqlite::Error::InvalidQuery)?,
        target_id: row.get(2)?,
        user_id: row.get(3)?,
        created: row.get(4)?,
    })
}

fn subscription_from_row(row: &Row) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: row.get(0)?,
        channel_id: row.get(1)?,
        subscriber_id: row.get(2)?,
        created: row.get(3)?,
    })
}

fn page_offset(page: usize, page_size: usize) -> usize {
    page.saturating_sub(1).saturating_mul(page_size)
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            let conn = Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            SCHEMA.validate(&conn)?;
            conn
        } else {
            let conn = Connection::open(db_path)?;
            SCHEMA.create(&conn)?;
            conn
        };
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl UserStore for SqliteStore {
    fn create_user(&self, new_user: &NewUser) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            &format!(
                "INSERT INTO {} (username, email, fullname, avatar_url, cover_image_url) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                USER_TABLE.name
            ),
            params![
                new_user.username,
                new_user.email,
                new_user.fullname,
                new_user.avatar_url,
                new_user.cover_image_url,
            ],
        );
        match inserted {
            Ok(_) => Ok(Some(conn.last_insert_rowid() as usize)),
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to create user {}", new_user.username))
            }
        }
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE id = ?1",
            USER_TABLE.name
        ))?;
        let mut rows = stmt.query_map(params![user_id], user_from_row)?;
        rows.next().transpose().map_err(Into::into)
    }

    fn find_user_by_login(&self, login: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE username = ?1 OR email = ?1",
            USER_TABLE.name
        ))?;
        let mut rows = stmt.query_map(params![login], user_from_row)?;
        rows.next().transpose().map_err(Into::into)
    }

    fn username_exists(&self, username: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE username = ?1",
                USER_TABLE.name
            ),
            params![username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn email_exists(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE email = ?1", USER_TABLE.name),
            params![email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn set_refresh_token(&self, user_id: usize, token: Option<&str>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE {} SET refresh_token = ?2 WHERE id = ?1",
                USER_TABLE.name
            ),
            params![user_id, token],
        )?;
        Ok(())
    }

    fn find_user_by_refresh_token(&self, token: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE refresh_token = ?1",
            USER_TABLE.name
        ))?;
        let mut rows = stmt.query_map(params![token], user_from_row)?;
        rows.next().transpose().map_err(Into::into)
    }

    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT user_id, salt, hash, hasher, created FROM {} WHERE user_id = ?1",
            USER_PASSWORD_CREDENTIALS_TABLE.name
        ))?;
        let mut rows = stmt.query_map(params![user_id], |row| {
            let hasher = match VidHubHasher::from_str(&row.get::<usize, String>(3)?) {
                Ok(x) => x,
                Err(_) => return Err(rusqlite::Error::InvalidQuery),
            };
            Ok(PasswordCredentials {
                user_id: row.get(0)?,
                salt: row.get(1)?,
                hash: row.get(2)?,
                hasher,
                created: row.get(4)?,
            })
        })?;
        rows.next().transpose().map_err(Into::into)
    }

    fn set_password_credentials(&self, credentials: &PasswordCredentials) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1",
                USER_PASSWORD_CREDENTIALS_TABLE.name
            ),
            params![credentials.user_id],
        )?;
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, salt, hash, hasher, created) VALUES (?1, ?2, ?3, ?4, ?5)",
                USER_PASSWORD_CREDENTIALS_TABLE.name
            ),
            params![
                credentials.user_id,
                credentials.salt,
                credentials.hash,
                credentials.hasher.to_string(),
                credentials.created,
            ],
        )?;
        Ok(())
    }
}

impl AuthTokenStore for SqliteStore {
    fn add_auth_token(&self, token: &AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, value, created, expires) VALUES (?1, ?2, ?3, ?4)",
                AUTH_TOKEN_TABLE.name
            ),
            params![token.user_id, token.value.0, token.created, token.expires],
        )?;
        Ok(())
    }

    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT user_id, value, created, expires FROM {} WHERE value = ?1",
            AUTH_TOKEN_TABLE.name
        ))?;
        let mut rows = stmt.query_map(params![value.0], |row| {
            Ok(AuthToken {
                user_id: row.get(0)?,
                value: AuthTokenValue(row.get(1)?),
                created: row.get(2)?,
                expires: row.get(3)?,
            })
        })?;
        let token = match rows.next().transpose()? {
            Some(token) => token,
            None => return Ok(None),
        };
        drop(rows);
        drop(stmt);
        if token.expires <= now() {
            conn.execute(
                &format!("DELETE FROM {} WHERE value = ?1", AUTH_TOKEN_TABLE.name),
                params![token.value.0],
            )?;
            return Ok(None);
        }
        Ok(Some(token))
    }

    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let token = match self.get_auth_token(value)? {
            Some(token) => token,
            None => return Ok(None),
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("DELETE FROM {} WHERE value = ?1", AUTH_TOKEN_TABLE.name),
            params![token.value.0],
        )?;
        Ok(Some(token))
    }

    fn delete_user_auth_tokens(&self, user_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE user_id = ?1", AUTH_TOKEN_TABLE.name),
            params![user_id],
        )?;
        Ok(deleted)
    }
}

impl WatchHistoryStore for SqliteStore {
    fn record_watch(&self, user_id: usize, video_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, video_id, watched) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(user_id, video_id) DO UPDATE SET watched = excluded.watched",
                WATCH_HISTORY_TABLE.name
            ),
            params![user_id, video_id, now()],
        )?;
        Ok(())
    }

    fn get_watch_history(
        &self,
        user_id: usize,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Video>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} v JOIN {} h ON h.video_id = v.id \
             WHERE h.user_id = ?1 ORDER BY h.watched DESC, h.rowid DESC LIMIT ?2 OFFSET ?3",
            VIDEO_COLUMNS
                .split(", ")
                .map(|c| format!("v.{}", c))
                .collect::<Vec<_>>()
                .join(", "),
            VIDEO_TABLE.name,
            WATCH_HISTORY_TABLE.name,
        ))?;
        let videos = stmt
            .query_map(
                params![user_id, page_size, page_offset(page, page_size)],
                video_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(videos)
    }
}

impl VideoStore for SqliteStore {
    fn insert_video(&self, new_video: &NewVideo) -> Result<Video> {
        let conn = self.conn.lock().unwrap();
        let video = Video {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: new_video.owner_id,
            title: new_video.title.clone(),
            description: new_video.description.clone(),
            video_url: new_video.video_url.clone(),
            thumbnail_url: new_video.thumbnail_url.clone(),
            duration_seconds: new_video.duration_seconds,
            views: 0,
            published: true,
            created: now(),
        };
        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                VIDEO_TABLE.name, VIDEO_COLUMNS
            ),
            params![
                video.id,
                video.owner_id,
                video.title,
                video.description,
                video.video_url,
                video.thumbnail_url,
                video.duration_seconds,
                video.views as i64,
                video.published as i64,
                video.created,
            ],
        )?;
        Ok(video)
    }

    fn get_video(&self, video_id: &str) -> Result<Option<Video>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE id = ?1",
            VIDEO_COLUMNS, VIDEO_TABLE.name
        ))?;
        let mut rows = stmt.query_map(params![video_id], video_from_row)?;
        rows.next().transpose().map_err(Into::into)
    }

    fn list_videos(
        &self,
        text_filter: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Video>> {
        let conn = self.conn.lock().unwrap();
        let pattern = text_filter.map(|text| format!("%{}%", text));
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE published = 1 \
             AND (?1 IS NULL OR title LIKE ?1 OR description LIKE ?1) \
             ORDER BY created DESC, rowid DESC LIMIT ?2 OFFSET ?3",
            VIDEO_COLUMNS, VIDEO_TABLE.name
        ))?;
        let videos = stmt
            .query_map(
                params![pattern, page_size, page_offset(page, page_size)],
                video_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(videos)
    }

    fn update_video(
        &self,
        video_id: &str,
        title: &str,
        description: &str,
    ) -> Result<Option<Video>> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                &format!(
                    "UPDATE {} SET title = ?2, description = ?3 WHERE id = ?1",
                    VIDEO_TABLE.name
                ),
                params![video_id, title, description],
            )?;
        }
        self.get_video(video_id)
    }

    fn delete_video(&self, video_id: &str) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        // Likes of the video's comments go first, then the comments themselves.
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE target_kind = ?1 AND target_id IN \
                 (SELECT id FROM {} WHERE video_id = ?2)",
                CONTENT_LIKE_TABLE.name, COMMENT_TABLE.name
            ),
            params![LikeTargetKind::Comment.to_int(), video_id],
        )?;
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE target_kind = ?1 AND target_id = ?2",
                CONTENT_LIKE_TABLE.name
            ),
            params![LikeTargetKind::Video.to_int(), video_id],
        )?;
        tx.execute(
            &format!("DELETE FROM {} WHERE video_id = ?1", COMMENT_TABLE.name),
            params![video_id],
        )?;
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE video_id = ?1",
                PLAYLIST_VIDEO_TABLE.name
            ),
            params![video_id],
        )?;
        tx.execute(
            &format!("DELETE FROM {} WHERE video_id = ?1", WATCH_HISTORY_TABLE.name),
            params![video_id],
        )?;
        let deleted = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", VIDEO_TABLE.name),
            params![video_id],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    fn set_video_published(&self, video_id: &str, published: bool) -> Result<Option<Video>> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                &format!("UPDATE {} SET published = ?2 WHERE id = ?1", VIDEO_TABLE.name),
                params![video_id, published as i64],
            )?;
        }
        self.get_video(video_id)
    }

    fn increment_video_views(&self, video_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE {} SET views = views + 1 WHERE id = ?1",
                VIDEO_TABLE.name
            ),
            params![video_id],
        )?;
        Ok(())
    }
}

impl CommentStore for SqliteStore {
    fn insert_comment(&self, video_id: &str, owner_id: usize, content: &str) -> Result<Comment> {
        let conn = self.conn.lock().unwrap();
        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            video_id: video_id.to_string(),
            owner_id,
            content: content.to_string(),
            created: now(),
        };
        conn.execute(
            &format!(
                "INSERT INTO {} (id, video_id, owner_id, content, created) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                COMMENT_TABLE.name
            ),
            params![
                comment.id,
                comment.video_id,
                comment.owner_id,
                comment.content,
                comment.created,
            ],
        )?;
        Ok(comment)
    }

    fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE id = ?1",
            COMMENT_TABLE.name
        ))?;
        let mut rows = stmt.query_map(params![comment_id], comment_from_row)?;
        rows.next().transpose().map_err(Into::into)
    }

    fn comments_for_video(&self, video_id: &str) -> Result<Vec<Comment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE video_id = ?1 ORDER BY created ASC, rowid ASC",
            COMMENT_TABLE.name
        ))?;
        let comments = stmt
            .query_map(params![video_id], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    fn update_comment(&self, comment_id: &str, content: &str) -> Result<Option<Comment>> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                &format!("UPDATE {} SET content = ?2 WHERE id = ?1", COMMENT_TABLE.name),
                params![comment_id, content],
            )?;
        }
        self.get_comment(comment_id)
    }

    fn delete_comment(&self, comment_id: &str) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE target_kind = ?1 AND target_id = ?2",
                CONTENT_LIKE_TABLE.name
            ),
            params![LikeTargetKind::Comment.to_int(), comment_id],
        )?;
        let deleted = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", COMMENT_TABLE.name),
            params![comment_id],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}

impl TweetStore for SqliteStore {
    fn insert_tweet(&self, owner_id: usize, content: &str) -> Result<Tweet> {
        let conn = self.conn.lock().unwrap();
        let tweet = Tweet {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            content: content.to_string(),
            created: now(),
        };
        conn.execute(
            &format!(
                "INSERT INTO {} (id, owner_id, content, created) VALUES (?1, ?2, ?3, ?4)",
                TWEET_TABLE.name
            ),
            params![tweet.id, tweet.owner_id, tweet.content, tweet.created],
        )?;
        Ok(tweet)
    }

    fn get_tweet(&self, tweet_id: &str) -> Result<Option<Tweet>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("SELECT * FROM {} WHERE id = ?1", TWEET_TABLE.name))?;
        let mut rows = stmt.query_map(params![tweet_id], tweet_from_row)?;
        rows.next().transpose().map_err(Into::into)
    }

    fn tweets_by_owner(&self, owner_id: usize) -> Result<Vec<Tweet>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE owner_id = ?1 ORDER BY created DESC, rowid DESC",
            TWEET_TABLE.name
        ))?;
        let tweets = stmt
            .query_map(params![owner_id], tweet_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tweets)
    }

    fn update_tweet(&self, tweet_id: &str, content: &str) -> Result<Option<Tweet>> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                &format!("UPDATE {} SET content = ?2 WHERE id = ?1", TWEET_TABLE.name),
                params![tweet_id, content],
            )?;
        }
        self.get_tweet(tweet_id)
    }

    fn delete_tweet(&self, tweet_id: &str) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE target_kind = ?1 AND target_id = ?2",
                CONTENT_LIKE_TABLE.name
            ),
            params![LikeTargetKind::Tweet.to_int(), tweet_id],
        )?;
        let deleted = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", TWEET_TABLE.name),
            params![tweet_id],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    fn search_tweets(&self, text: &str, page: usize, page_size: usize) -> Result<Vec<Tweet>> {
        let conn = self.conn.lock().unwrap();
        let pattern = format!("%{}%", text);
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE content LIKE ?1 \
             ORDER BY created DESC, rowid DESC LIMIT ?2 OFFSET ?3",
            TWEET_TABLE.name
        ))?;
        let tweets = stmt
            .query_map(
                params![pattern, page_size, page_offset(page, page_size)],
                tweet_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tweets)
    }
}

impl EngagementStore for SqliteStore {
    fn find_like(&self, key: &LikeKey) -> Result<Option<Like>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE target_kind = ?1 AND target_id = ?2 AND user_id = ?3",
            CONTENT_LIKE_TABLE.name
        ))?;
        let mut rows = stmt.query_map(
            params![key.target_kind.to_int(), key.target_id, key.user_id],
            like_from_row,
        )?;
        rows.next().transpose().map_err(Into::into)
    }

    fn insert_like(&self, key: &LikeKey) -> Result<RelationInsert<Like>> {
        let conn = self.conn.lock().unwrap();
        let created = now();
        let inserted = conn.execute(
            &format!(
                "INSERT INTO {} (target_kind, target_id, user_id, created) \
                 VALUES (?1, ?2, ?3, ?4)",
                CONTENT_LIKE_TABLE.name
            ),
            params![key.target_kind.to_int(), key.target_id, key.user_id, created],
        );
        match inserted {
            Ok(_) => Ok(RelationInsert::Inserted(Like {
                id: conn.last_insert_rowid() as usize,
                target_kind: key.target_kind,
                target_id: key.target_id.clone(),
                user_id: key.user_id,
                created,
            })),
            Err(err) if is_unique_violation(&err) => Ok(RelationInsert::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_like(&self, key: &LikeKey) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE target_kind = ?1 AND target_id = ?2 AND user_id = ?3",
                CONTENT_LIKE_TABLE.name
            ),
            params![key.target_kind.to_int(), key.target_id, key.user_id],
        )?;
        Ok(deleted > 0)
    }

    fn liked_videos(&self, user_id: usize) -> Result<Vec<Video>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} v JOIN {} l ON l.target_id = v.id \
             WHERE l.target_kind = ?1 AND l.user_id = ?2 \
             ORDER BY l.created DESC, l.id DESC",
            VIDEO_COLUMNS
                .split(", ")
                .map(|c| format!("v.{}", c))
                .collect::<Vec<_>>()
                .join(", "),
            VIDEO_TABLE.name,
            CONTENT_LIKE_TABLE.name,
        ))?;
        let videos = stmt
            .query_map(
                params![LikeTargetKind::Video.to_int(), user_id],
                video_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(videos)
    }

    fn find_subscription(&self, key: &SubscriptionKey) -> Result<Option<Subscription>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE channel_id = ?1 AND subscriber_id = ?2",
            SUBSCRIPTION_TABLE.name
        ))?;
        let mut rows = stmt.query_map(
            params![key.channel_id, key.subscriber_id],
            subscription_from_row,
        )?;
        rows.next().transpose().map_err(Into::into)
    }

    fn insert_subscription(&self, key: &SubscriptionKey) -> Result<RelationInsert<Subscription>> {
        let conn = self.conn.lock().unwrap();
        let created = now();
        let inserted = conn.execute(
            &format!(
                "INSERT INTO {} (channel_id, subscriber_id, created) VALUES (?1, ?2, ?3)",
                SUBSCRIPTION_TABLE.name
            ),
            params![key.channel_id, key.subscriber_id, created],
        );
        match inserted {
            Ok(_) => Ok(RelationInsert::Inserted(Subscription {
                id: conn.last_insert_rowid() as usize,
                channel_id: key.channel_id,
                subscriber_id: key.subscriber_id,
                created,
            })),
            Err(err) if is_unique_violation(&err) => Ok(RelationInsert::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_subscription(&self, key: &SubscriptionKey) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE channel_id = ?1 AND subscriber_id = ?2",
                SUBSCRIPTION_TABLE.name
            ),
            params![key.channel_id, key.subscriber_id],
        )?;
        Ok(deleted > 0)
    }

    fn channel_subscribers(&self, channel_id: usize) -> Result<Vec<UserProfile>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT u.* FROM {} u JOIN {} s ON s.subscriber_id = u.id \
             WHERE s.channel_id = ?1 ORDER BY s.created ASC",
            USER_TABLE.name, SUBSCRIPTION_TABLE.name
        ))?;
        let profiles = stmt
            .query_map(params![channel_id], |row| {
                user_from_row(row).map(|user| UserProfile::from(&user))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    fn subscribed_channels(&self, subscriber_id: usize) -> Result<Vec<UserProfile>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT u.* FROM {} u JOIN {} s ON s.channel_id = u.id \
             WHERE s.subscriber_id = ?1 ORDER BY s.created ASC",
            USER_TABLE.name, SUBSCRIPTION_TABLE.name
        ))?;
        let profiles = stmt
            .query_map(params![subscriber_id], |row| {
                user_from_row(row).map(|user| UserProfile::from(&user))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }
}

impl StatsStore for SqliteStore {
    fn channel_stats(&self, channel_id: usize) -> Result<ChannelStats> {
        let conn = self.conn.lock().unwrap();
        engagement::channel_stats(&conn, channel_id)
    }

    fn channel_videos(
        &self,
        channel_id: usize,
        include_unpublished: bool,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<VideoSummary>> {
        let conn = self.conn.lock().unwrap();
        engagement::channel_videos(&conn, channel_id, include_unpublished, page, page_size)
    }

    fn video_like_count(&self, video_id: &str) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        engagement::video_like_count(&conn, video_id)
    }
}

impl SqliteStore {
    fn playlist_videos(conn: &Connection, playlist_id: &str) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT video_id FROM {} WHERE playlist_id = ?1 ORDER BY position ASC",
            PLAYLIST_VIDEO_TABLE.name
        ))?;
        let videos = stmt
            .query_map(params![playlist_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(videos)
    }

    fn playlist_from_row(conn: &Connection, row: &Row) -> Result<Playlist> {
        let id: String = row.get(0)?;
        let videos = Self::playlist_videos(conn, &id)?;
        Ok(Playlist {
            id,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            created: row.get(4)?,
            videos,
        })
    }
}

impl PlaylistStore for SqliteStore {
    fn create_playlist(&self, owner_id: usize, name: &str, description: &str) -> Result<Playlist> {
        let conn = self.conn.lock().unwrap();
        let playlist = Playlist {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            name: name.to_string(),
            description: description.to_string(),
            created: now(),
            videos: vec![],
        };
        conn.execute(
            &format!(
                "INSERT INTO {} (id, owner_id, name, description, created) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                PLAYLIST_TABLE.name
            ),
            params![
                playlist.id,
                playlist.owner_id,
                playlist.name,
                playlist.description,
                playlist.created,
            ],
        )?;
        Ok(playlist)
    }

    fn get_playlist(&self, playlist_id: &str) -> Result<Option<Playlist>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, owner_id, name, description, created FROM {} WHERE id = ?1",
            PLAYLIST_TABLE.name
        ))?;
        let row = stmt
            .query_map(params![playlist_id], |row| {
                Ok((
                    row.get::<usize, String>(0)?,
                    row.get::<usize, usize>(1)?,
                    row.get::<usize, String>(2)?,
                    row.get::<usize, String>(3)?,
                    row.get::<usize, i64>(4)?,
                ))
            })?
            .next()
            .transpose()?;
        let (id, owner_id, name, description, created) = match row {
            Some(row) => row,
            None => return Ok(None),
        };
        let videos = Self::playlist_videos(&conn, &id)?;
        Ok(Some(Playlist {
            id,
            owner_id,
            name,
            description,
            created,
            videos,
        }))
    }

    fn playlists_by_owner(&self, owner_id: usize) -> Result<Vec<Playlist>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, owner_id, name, description, created FROM {} \
             WHERE owner_id = ?1 ORDER BY created DESC, rowid DESC",
            PLAYLIST_TABLE.name
        ))?;
        let rows = stmt
            .query_map(params![owner_id], |row| {
                Ok((
                    row.get::<usize, String>(0)?,
                    row.get::<usize, usize>(1)?,
                    row.get::<usize, String>(2)?,
                    row.get::<usize, String>(3)?,
                    row.get::<usize, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut playlists = Vec::with_capacity(rows.len());
        for (id, owner_id, name, description, created) in rows {
            let videos = Self::playlist_videos(&conn, &id)?;
            playlists.push(Playlist {
                id,
                owner_id,
                name,
                description,
                created,
                videos,
            });
        }
        Ok(playlists)
    }

    fn update_playlist(
        &self,
        playlist_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Playlist>> {
        {
            let conn = self.conn.lock().unwrap();
            if let Some(name) = name {
                conn.execute(
                    &format!("UPDATE {} SET name = ?2 WHERE id = ?1", PLAYLIST_TABLE.name),
                    params![playlist_id, name],
                )?;
            }
            if let Some(description) = description {
                conn.execute(
                    &format!(
                        "UPDATE {} SET description = ?2 WHERE id = ?1",
                        PLAYLIST_TABLE.name
                    ),
                    params![playlist_id, description],
                )?;
            }
        }
        self.get_playlist(playlist_id)
    }

    fn delete_playlist(&self, playlist_id: &str) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE playlist_id = ?1",
                PLAYLIST_VIDEO_TABLE.name
            ),
            params![playlist_id],
        )?;
        let deleted = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", PLAYLIST_TABLE.name),
            params![playlist_id],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    fn add_playlist_video(&self, playlist_id: &str, video_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            &format!(
                "INSERT INTO {} (playlist_id, video_id, position) VALUES (?1, ?2, \
                 (SELECT COALESCE(MAX(position), -1) + 1 FROM {} WHERE playlist_id = ?1))",
                PLAYLIST_VIDEO_TABLE.name, PLAYLIST_VIDEO_TABLE.name
            ),
            params![playlist_id, video_id],
        );
        match inserted {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn remove_playlist_video(&self, playlist_id: &str, video_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE playlist_id = ?1 AND video_id = ?2",
                PLAYLIST_VIDEO_TABLE.name
            ),
            params![playlist_id, video_id],
        )?;
        Ok(deleted > 0)
    }
}
