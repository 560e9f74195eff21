//! HTTP client for end-to-end tests
//!
//! High-level wrapper around reqwest with methods for every endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use super::fixtures::{mp4_bytes, png_bytes};
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows. For most tests, use
    /// `authenticated()` or `authenticated_viewer()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client pre-authenticated as the seeded uploader user.
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        Self::authenticated_as(base_url, UPLOADER_USER, UPLOADER_PASS).await
    }

    /// Creates a client pre-authenticated as the seeded viewer user.
    pub async fn authenticated_viewer(base_url: String) -> Self {
        Self::authenticated_as(base_url, VIEWER_USER, VIEWER_PASS).await
    }

    pub async fn authenticated_as(base_url: String, username: &str, password: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.login(username, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Test user authentication failed: {:?}",
            response.text().await
        );

        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    // ========================================================================
    // User Endpoints
    // ========================================================================

    /// POST /api/v1/users/register
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        fullname: &str,
        password: &str,
    ) -> Response {
        let form = Form::new()
            .text("username", username.to_string())
            .text("email", email.to_string())
            .text("fullName", fullname.to_string())
            .text("password", password.to_string())
            .part(
                "avatar",
                Part::bytes(png_bytes()).file_name("avatar.png"),
            );

        self.client
            .post(self.url("/users/register"))
            .multipart(form)
            .send()
            .await
            .expect("Register request failed")
    }

    /// POST /api/v1/users/login
    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.client
            .post(self.url("/users/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// POST /api/v1/users/logout
    pub async fn logout(&self) -> Response {
        self.client
            .post(self.url("/users/logout"))
            .send()
            .await
            .expect("Logout request failed")
    }

    /// POST /api/v1/users/refresh-token (cookie-based)
    pub async fn refresh_token(&self) -> Response {
        self.client
            .post(self.url("/users/refresh-token"))
            .send()
            .await
            .expect("Refresh request failed")
    }

    /// POST /api/v1/users/refresh-token with an explicit token in the body
    pub async fn refresh_token_with(&self, refresh_token: &str) -> Response {
        self.client
            .post(self.url("/users/refresh-token"))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .expect("Refresh request failed")
    }

    /// GET /api/v1/users/me
    pub async fn me(&self) -> Response {
        self.client
            .get(self.url("/users/me"))
            .send()
            .await
            .expect("Me request failed")
    }

    /// POST /api/v1/users/change-password
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Response {
        self.client
            .post(self.url("/users/change-password"))
            .json(&json!({ "oldPassword": old_password, "newPassword": new_password }))
            .send()
            .await
            .expect("Change password request failed")
    }

    /// GET /api/v1/users/history
    pub async fn watch_history(&self) -> Response {
        self.client
            .get(self.url("/users/history"))
            .send()
            .await
            .expect("History request failed")
    }

    /// GET /api/v1/users/history?page=&limit=
    pub async fn watch_history_page(&self, page: usize, limit: usize) -> Response {
        self.client
            .get(self.url(&format!("/users/history?page={}&limit={}", page, limit)))
            .send()
            .await
            .expect("History request failed")
    }

    // ========================================================================
    // Video Endpoints
    // ========================================================================

    /// POST /api/v1/videos with a synthetic mp4 and png thumbnail
    pub async fn publish_video(&self, title: &str, description: &str) -> Response {
        self.publish_video_with_duration(title, description, 12).await
    }

    pub async fn publish_video_with_duration(
        &self,
        title: &str,
        description: &str,
        duration_seconds: u32,
    ) -> Response {
        let form = Form::new()
            .text("title", title.to_string())
            .text("description", description.to_string())
            .part(
                "video",
                Part::bytes(mp4_bytes(duration_seconds)).file_name("video.mp4"),
            )
            .part(
                "thumbnail",
                Part::bytes(png_bytes()).file_name("thumbnail.png"),
            );

        self.client
            .post(self.url("/videos"))
            .multipart(form)
            .send()
            .await
            .expect("Publish video request failed")
    }

    /// GET /api/v1/videos
    pub async fn list_videos(&self) -> Response {
        self.client
            .get(self.url("/videos"))
            .send()
            .await
            .expect("List videos request failed")
    }

    /// GET /api/v1/videos?text=...
    pub async fn search_videos(&self, text: &str) -> Response {
        self.client
            .get(self.url("/videos"))
            .query(&[("text", text)])
            .send()
            .await
            .expect("Search videos request failed")
    }

    /// GET /api/v1/videos/{id}
    pub async fn get_video(&self, video_id: &str) -> Response {
        self.client
            .get(self.url(&format!("/videos/{}", video_id)))
            .send()
            .await
            .expect("Get video request failed")
    }

    /// PATCH /api/v1/videos/{id}
    pub async fn update_video(&self, video_id: &str, body: serde_json::Value) -> Response {
        self.client
            .patch(self.url(&format!("/videos/{}", video_id)))
            .json(&body)
            .send()
            .await
            .expect("Update video request failed")
    }

    /// DELETE /api/v1/videos/{id}
    pub async fn delete_video(&self, video_id: &str) -> Response {
        self.client
            .delete(self.url(&format!("/videos/{}", video_id)))
            .send()
            .await
            .expect("Delete video request failed")
    }

    /// PATCH /api/v1/videos/{id}/toggle-publish
    pub async fn toggle_publish(&self, video_id: &str) -> Response {
        self.client
            .patch(self.url(&format!("/videos/{}/toggle-publish", video_id)))
            .send()
            .await
            .expect("Toggle publish request failed")
    }

    // ========================================================================
    // Comment Endpoints
    // ========================================================================

    /// POST /api/v1/comments/{videoId}
    pub async fn post_comment(&self, video_id: &str, content: &str) -> Response {
        self.client
            .post(self.url(&format!("/comments/{}", video_id)))
            .json(&json!({ "content": content }))
            .send()
            .await
            .expect("Post comment request failed")
    }

    /// GET /api/v1/comments/{videoId}
    pub async fn list_comments(&self, video_id: &str) -> Response {
        self.client
            .get(self.url(&format!("/comments/{}", video_id)))
            .send()
            .await
            .expect("List comments request failed")
    }

    /// PATCH /api/v1/comments/{id}
    pub async fn update_comment(&self, comment_id: &str, content: &str) -> Response {
        self.client
            .patch(self.url(&format!("/comments/{}", comment_id)))
            .json(&json!({ "content": content }))
            .send()
            .await
            .expect("Update comment request failed")
    }

    /// DELETE /api/v1/comments/{id}
    pub async fn delete_comment(&self, comment_id: &str) -> Response {
        self.client
            .delete(self.url(&format!("/comments/{}", comment_id)))
            .send()
            .await
            .expect("Delete comment request failed")
    }

    // ========================================================================
    // Like Endpoints
    // ========================================================================

    /// POST /api/v1/likes/toggle/v/{id}
    pub async fn toggle_video_like(&self, video_id: &str) -> Response {
        self.client
            .post(self.url(&format!("/likes/toggle/v/{}", video_id)))
            .send()
            .await
            .expect("Toggle video like request failed")
    }

    /// POST /api/v1/likes/toggle/c/{id}
    pub async fn toggle_comment_like(&self, comment_id: &str) -> Response {
        self.client
            .post(self.url(&format!("/likes/toggle/c/{}", comment_id)))
            .send()
            .await
            .expect("Toggle comment like request failed")
    }

    /// POST /api/v1/likes/toggle/t/{id}
    pub async fn toggle_tweet_like(&self, tweet_id: &str) -> Response {
        self.client
            .post(self.url(&format!("/likes/toggle/t/{}", tweet_id)))
            .send()
            .await
            .expect("Toggle tweet like request failed")
    }

    /// GET /api/v1/likes/videos
    pub async fn liked_videos(&self) -> Response {
        self.client
            .get(self.url("/likes/videos"))
            .send()
            .await
            .expect("Liked videos request failed")
    }

    // ========================================================================
    // Subscription Endpoints
    // ========================================================================

    /// POST /api/v1/subscriptions/c/{channelId}
    pub async fn toggle_subscription(&self, channel_id: usize) -> Response {
        self.client
            .post(self.url(&format!("/subscriptions/c/{}", channel_id)))
            .send()
            .await
            .expect("Toggle subscription request failed")
    }

    /// GET /api/v1/subscriptions/c/{channelId}
    pub async fn channel_subscribers(&self, channel_id: usize) -> Response {
        self.client
            .get(self.url(&format!("/subscriptions/c/{}", channel_id)))
            .send()
            .await
            .expect("Channel subscribers request failed")
    }

    /// GET /api/v1/subscriptions/u/{subscriberId}
    pub async fn subscribed_channels(&self, subscriber_id: usize) -> Response {
        self.client
            .get(self.url(&format!("/subscriptions/u/{}", subscriber_id)))
            .send()
            .await
            .expect("Subscribed channels request failed")
    }

    // ========================================================================
    // Tweet Endpoints
    // ========================================================================

    /// POST /api/v1/tweets
    pub async fn post_tweet(&self, content: &str) -> Response {
        self.client
            .post(self.url("/tweets"))
            .json(&json!({ "content": content }))
            .send()
            .await
            .expect("Post tweet request failed")
    }

    /// GET /api/v1/tweets
    pub async fn my_tweets(&self) -> Response {
        self.client
            .get(self.url("/tweets"))
            .send()
            .await
            .expect("My tweets request failed")
    }

    /// GET /api/v1/tweets/search?text=...
    pub async fn search_tweets(&self, text: &str) -> Response {
        self.client
            .get(self.url("/tweets/search"))
            .query(&[("text", text)])
            .send()
            .await
            .expect("Search tweets request failed")
    }

    /// PATCH /api/v1/tweets/{id}
    pub async fn update_tweet(&self, tweet_id: &str, content: &str) -> Response {
        self.client
            .patch(self.url(&format!("/tweets/{}", tweet_id)))
            .json(&json!({ "content": content }))
            .send()
            .await
            .expect("Update tweet request failed")
    }

    /// DELETE /api/v1/tweets/{id}
    pub async fn delete_tweet(&self, tweet_id: &str) -> Response {
        self.client
            .delete(self.url(&format!("/tweets/{}", tweet_id)))
            .send()
            .await
            .expect("Delete tweet request failed")
    }

    // ========================================================================
    // Playlist Endpoints
    // ========================================================================

    /// POST /api/v1/playlists
    pub async fn create_playlist(&self, name: &str, description: &str) -> Response {
        self.client
            .post(self.url("/playlists"))
            .json(&json!({ "name": name, "description": description }))
            .send()
            .await
            .expect("Create playlist request failed")
    }

    /// GET /api/v1/playlists/user/{userId}
    pub async fn user_playlists(&self, user_id: usize) -> Response {
        self.client
            .get(self.url(&format!("/playlists/user/{}", user_id)))
            .send()
            .await
            .expect("User playlists request failed")
    }

    /// GET /api/v1/playlists/{id}
    pub async fn get_playlist(&self, playlist_id: &str) -> Response {
        self.client
            .get(self.url(&format!("/playlists/{}", playlist_id)))
            .send()
            .await
            .expect("Get playlist request failed")
    }

    /// PATCH /api/v1/playlists/{id}
    pub async fn update_playlist(&self, playlist_id: &str, body: serde_json::Value) -> Response {
        self.client
            .patch(self.url(&format!("/playlists/{}", playlist_id)))
            .json(&body)
            .send()
            .await
            .expect("Update playlist request failed")
    }

    /// DELETE /api/v1/playlists/{id}
    pub async fn delete_playlist(&self, playlist_id: &str) -> Response {
        self.client
            .delete(self.url(&format!("/playlists/{}", playlist_id)))
            .send()
            .await
            .expect("Delete playlist request failed")
    }

    /// PATCH /api/v1/playlists/{id}/videos/{videoId}
    pub async fn add_playlist_video(&self, playlist_id: &str, video_id: &str) -> Response {
        self.client
            .patch(self.url(&format!("/playlists/{}/videos/{}", playlist_id, video_id)))
            .send()
            .await
            .expect("Add playlist video request failed")
    }

    /// DELETE /api/v1/playlists/{id}/videos/{videoId}
    pub async fn remove_playlist_video(&self, playlist_id: &str, video_id: &str) -> Response {
        self.client
            .delete(self.url(&format!("/playlists/{}/videos/{}", playlist_id, video_id)))
            .send()
            .await
            .expect("Remove playlist video request failed")
    }

    // ========================================================================
    // Dashboard Endpoints
    // ========================================================================

    /// GET /api/v1/dashboard/stats/{channelId}
    pub async fn channel_stats(&self, channel_id: usize) -> Response {
        self.client
            .get(self.url(&format!("/dashboard/stats/{}", channel_id)))
            .send()
            .await
            .expect("Channel stats request failed")
    }

    /// GET /api/v1/dashboard/videos/{channelId}
    pub async fn channel_videos(&self, channel_id: usize) -> Response {
        self.client
            .get(self.url(&format!("/dashboard/videos/{}", channel_id)))
            .send()
            .await
            .expect("Channel videos request failed")
    }
}
