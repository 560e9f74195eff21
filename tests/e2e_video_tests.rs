//! End-to-end tests for video publishing, listing, and lifecycle.

mod common;

use common::{TestClient, TestServer};
use reqwest::StatusCode;

async fn publish(client: &TestClient, title: &str) -> String {
    let response = client.publish_video(title, "a description").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_publish_requires_authentication() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.publish_video("My Video", "desc").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_publish_probes_duration() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client
        .publish_video_with_duration("Timed", "desc", 42)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["duration_seconds"], 42.0);
    assert_eq!(body["data"]["views"], 0);
    assert_eq!(body["data"]["published"], true);
}

#[tokio::test]
async fn test_publish_rejects_non_video_payload() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    // Swap the payloads: a png in the video slot must be rejected
    let form = reqwest::multipart::Form::new()
        .text("title", "Bad upload")
        .part(
            "video",
            reqwest::multipart::Part::bytes(common::png_bytes()).file_name("video.mp4"),
        )
        .part(
            "thumbnail",
            reqwest::multipart::Part::bytes(common::png_bytes()).file_name("thumb.png"),
        );
    let response = client
        .client
        .post(format!("{}/api/v1/videos", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_and_text_search() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    publish(&client, "Cooking pasta").await;
    publish(&client, "Cooking rice").await;
    publish(&client, "Woodworking basics").await;

    let response = client.list_videos().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let response = client.search_videos("cooking").await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let response = client.search_videos("knitting").await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_get_video_counts_views_and_records_history() {
    let server = TestServer::spawn().await;
    let uploader = TestClient::authenticated(server.base_url.clone()).await;
    let viewer = TestClient::authenticated_viewer(server.base_url.clone()).await;

    let video_id = publish(&uploader, "Watch me").await;

    let response = viewer.get_video(&video_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["views"], 1);
    assert_eq!(body["data"]["likes"], 0);

    // Anonymous views also count
    let anon = TestClient::new(server.base_url.clone());
    let response = anon.get_video(&video_id).await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["views"], 2);

    // Only the authenticated view landed in the viewer's history
    let response = viewer.watch_history().await;
    let body: serde_json::Value = response.json().await.unwrap();
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], video_id.as_str());
}

#[tokio::test]
async fn test_watch_history_pages_most_recent_first() {
    let server = TestServer::spawn().await;
    let uploader = TestClient::authenticated(server.base_url.clone()).await;
    let viewer = TestClient::authenticated_viewer(server.base_url.clone()).await;

    let first = publish(&uploader, "First").await;
    let second = publish(&uploader, "Second").await;
    let third = publish(&uploader, "Third").await;
    for id in [&first, &second, &third] {
        viewer.get_video(id).await;
    }

    let response = viewer.watch_history_page(1, 2).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    let page1 = body["data"].as_array().unwrap();
    assert_eq!(page1.len(), 2);
    assert_eq!(page1[0]["id"], third.as_str());
    assert_eq!(page1[1]["id"], second.as_str());

    let response = viewer.watch_history_page(2, 2).await;
    let body: serde_json::Value = response.json().await.unwrap();
    let page2 = body["data"].as_array().unwrap();
    assert_eq!(page2.len(), 1);
    assert_eq!(page2[0]["id"], first.as_str());

    let response = viewer.watch_history_page(3, 2).await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unpublished_video_is_owner_only() {
    let server = TestServer::spawn().await;
    let uploader = TestClient::authenticated(server.base_url.clone()).await;
    let viewer = TestClient::authenticated_viewer(server.base_url.clone()).await;

    let video_id = publish(&uploader, "Draft").await;

    let response = uploader.toggle_publish(&video_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["published"], false);

    // Hidden from everyone else, indistinguishable from missing
    let response = viewer.get_video(&video_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Gone from the public listing too
    let response = viewer.list_videos().await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Still visible to its owner
    let response = uploader.get_video(&video_id).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_is_owner_only() {
    let server = TestServer::spawn().await;
    let uploader = TestClient::authenticated(server.base_url.clone()).await;
    let viewer = TestClient::authenticated_viewer(server.base_url.clone()).await;

    let video_id = publish(&uploader, "Original title").await;

    let response = viewer
        .update_video(&video_id, serde_json::json!({ "title": "Hijacked" }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = uploader
        .update_video(&video_id, serde_json::json!({ "title": "Renamed" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Renamed");
    assert_eq!(body["data"]["description"], "a description");
}

#[tokio::test]
async fn test_delete_cascades() {
    let server = TestServer::spawn().await;
    let uploader = TestClient::authenticated(server.base_url.clone()).await;
    let viewer = TestClient::authenticated_viewer(server.base_url.clone()).await;

    let video_id = publish(&uploader, "Doomed").await;
    let response = viewer.post_comment(&video_id, "nice").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    viewer.toggle_video_like(&video_id).await;

    let response = viewer.delete_video(&video_id).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = uploader.delete_video(&video_id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = uploader.get_video(&video_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = viewer.list_comments(&video_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The like rows went with it
    let response = viewer.liked_videos().await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
