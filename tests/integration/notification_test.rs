//! Integration tests for notification feeds.

use chrono::{Duration, Utc};
use http::StatusCode;
use serde_json::json;

use docrelay_core::types::UserId;
use docrelay_database::NotificationStore;
use docrelay_database::memory::MemoryNotificationStore;
use docrelay_entity::notification::{NewNotification, NotificationType};
use docrelay_realtime::notification::formatter;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_create_pushes_full_feed_to_owner() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({"userId": "u1", "title": "Report ready", "message": "Q3", "type": "success"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let created = &response.body["data"];
    assert_eq!(created["title"], "Report ready");
    assert_eq!(created["type"], "success");
    assert_eq!(created["isRead"], false);
    assert_eq!(created["userId"], "u1");
    assert!(created["time"].as_str().unwrap().ends_with("sec ago"));

    let pushes = app.gateway.wait_for(1).await;
    let (to, envelope) = &pushes[0];
    assert_eq!(to, &Some(UserId::new("u1")));
    assert_eq!(envelope.destination, "/queue/notifications");
    let feed = envelope.payload.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_push_item_mode_sends_single_notification() {
    let app = TestApp::new();

    app.request(
        "POST",
        "/api/notifications",
        Some(json!({"userId": "u1", "title": "One", "message": "m", "pushItem": true})),
    )
    .await;

    let pushes = app.gateway.wait_for(1).await;
    assert_eq!(pushes[0].1.payload["title"], "One");
    assert_eq!(pushes[0].1.payload["type"], "info");
}

#[tokio::test]
async fn test_broadcast_goes_to_topic_and_not_to_feeds() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({"title": "Maintenance", "message": "Tonight", "type": "warning"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.body["data"]["userId"].is_null());

    let pushes = app.gateway.wait_for(1).await;
    assert_eq!(pushes[0].0, None);
    assert_eq!(pushes[0].1.destination, "/topic/notifications");
    assert_eq!(pushes[0].1.payload["title"], "Maintenance");

    let response = app.request("GET", "/api/notifications/u1", None).await;
    assert_eq!(response.body["data"], json!([]));
}

#[tokio::test]
async fn test_list_is_most_recent_first() {
    let app = TestApp::new();
    for title in ["first", "second", "third"] {
        app.request(
            "POST",
            "/api/notifications",
            Some(json!({"userId": "u1", "title": title, "message": "m"})),
        )
        .await;
    }
    app.request(
        "POST",
        "/api/notifications",
        Some(json!({"userId": "u2", "title": "other", "message": "m"})),
    )
    .await;

    let response = app.request("GET", "/api/notifications/u1", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let titles: Vec<_> = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_mark_all_read_then_feed_push() {
    let app = TestApp::new();
    for title in ["a", "b"] {
        app.request(
            "POST",
            "/api/notifications",
            Some(json!({"userId": "u1", "title": title, "message": "m"})),
        )
        .await;
    }
    app.gateway.wait_for(2).await;

    let response = app.request("PUT", "/api/notifications/u1/read-all", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["marked"], 2);

    let pushes = app.gateway.wait_for(3).await;
    let feed = pushes[2].1.payload.as_array().unwrap();
    assert_eq!(feed.len(), 2);
    assert!(feed.iter().all(|n| n["isRead"] == true));

    let response = app.request("PUT", "/api/notifications/u1/read-all", None).await;
    assert_eq!(response.body["data"]["marked"], 0);
}

#[tokio::test]
async fn test_empty_feed_for_unknown_user() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/notifications/nobody", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"], json!([]));

    let response = app.request("PUT", "/api/notifications/nobody/read-all", None).await;
    assert_eq!(response.body["data"]["marked"], 0);
}

#[tokio::test]
async fn test_invalid_create_is_rejected_without_push() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({"userId": "u1", "title": "", "message": "m"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    app.gateway.assert_settled_at(0).await;
}

#[tokio::test]
async fn test_feed_renders_relative_time_bands() {
    let store = MemoryNotificationStore::new();
    let now = Utc::now();
    let user = UserId::new("u1");
    for (title, age) in [("old", Duration::days(400)), ("week", Duration::days(8))] {
        store.insert_with_timestamp(
            NewNotification::for_user(user.clone(), title, "m", NotificationType::Info),
            now - age,
        );
    }

    let rendered: Vec<_> = store
        .list_by_user(&user)
        .await
        .unwrap()
        .iter()
        .map(|n| formatter::render(n, now).time)
        .collect();
    assert_eq!(rendered, vec!["1 week ago", "1 year ago"]);
}
