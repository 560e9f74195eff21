//! End-to-end tests for channel dashboard rollups.

mod common;

use common::{TestClient, TestServer};
use reqwest::StatusCode;

#[tokio::test]
async fn test_dashboard_requires_authentication() {
    let server = TestServer::spawn().await;
    let anon = TestClient::new(server.base_url.clone());

    let response = anon.channel_stats(server.uploader_id).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = anon.channel_videos(server.uploader_id).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_channel_rolls_up_to_zeros() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_viewer(server.base_url.clone()).await;

    let response = client.channel_stats(server.uploader_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["total_videos"], 0);
    assert_eq!(body["data"]["total_views"], 0);
    assert_eq!(body["data"]["total_likes"], 0);
    assert_eq!(body["data"]["total_subscribers"], 0);
    assert_eq!(body["data"]["total_posts"], 0);
}

#[tokio::test]
async fn test_unknown_channel_rolls_up_to_zeros_too() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_viewer(server.base_url.clone()).await;

    // Indistinguishable from an empty channel, deliberately not a 404
    let response = client.channel_stats(999_999).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["total_videos"], 0);
}

#[tokio::test]
async fn test_stats_reflect_channel_activity() {
    let server = TestServer::spawn().await;
    let uploader = TestClient::authenticated(server.base_url.clone()).await;
    let viewer = TestClient::authenticated_viewer(server.base_url.clone()).await;

    let response = uploader.publish_video("One", "").await;
    let body: serde_json::Value = response.json().await.unwrap();
    let video_id = body["data"]["id"].as_str().unwrap().to_string();
    uploader.publish_video("Two", "").await;

    viewer.get_video(&video_id).await; // one view
    viewer.toggle_video_like(&video_id).await;
    viewer.toggle_subscription(server.uploader_id).await;
    uploader.post_tweet("announcement").await;

    let response = viewer.channel_stats(server.uploader_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["total_videos"], 2);
    assert_eq!(body["data"]["total_views"], 1);
    assert_eq!(body["data"]["total_likes"], 1);
    assert_eq!(body["data"]["total_subscribers"], 1);
    assert_eq!(body["data"]["total_posts"], 1);

    // Unsubscribing is reflected on the next read
    viewer.toggle_subscription(server.uploader_id).await;
    let response = viewer.channel_stats(server.uploader_id).await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["total_subscribers"], 0);
}

#[tokio::test]
async fn test_dashboard_videos_include_unpublished() {
    let server = TestServer::spawn().await;
    let uploader = TestClient::authenticated(server.base_url.clone()).await;

    let response = uploader.publish_video("Public", "").await;
    let body: serde_json::Value = response.json().await.unwrap();
    let public_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = uploader.publish_video("Draft", "").await;
    let body: serde_json::Value = response.json().await.unwrap();
    let draft_id = body["data"]["id"].as_str().unwrap().to_string();
    uploader.toggle_publish(&draft_id).await;

    let response = uploader.channel_videos(server.uploader_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    let videos = body["data"].as_array().unwrap();
    assert_eq!(videos.len(), 2);

    let ids: Vec<&str> = videos.iter().map(|v| v["id"].as_str().unwrap()).collect();
    assert!(ids.contains(&public_id.as_str()));
    assert!(ids.contains(&draft_id.as_str()));
}

#[tokio::test]
async fn test_dashboard_hides_drafts_from_other_users() {
    let server = TestServer::spawn().await;
    let uploader = TestClient::authenticated(server.base_url.clone()).await;
    let viewer = TestClient::authenticated_viewer(server.base_url.clone()).await;

    let response = uploader.publish_video("Public", "").await;
    let body: serde_json::Value = response.json().await.unwrap();
    let public_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = uploader.publish_video("Draft", "").await;
    let body: serde_json::Value = response.json().await.unwrap();
    let draft_id = body["data"]["id"].as_str().unwrap().to_string();
    uploader.toggle_publish(&draft_id).await;

    let response = viewer.channel_videos(server.uploader_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    let videos = body["data"].as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["id"], public_id.as_str());
    assert!(videos.iter().all(|v| v["id"] != draft_id.as_str()));
}
