//! Integration tests for viewer presence relay and presence records.

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use serde_json::json;

use docrelay_core::error::AppError;
use docrelay_core::result::AppResult;
use docrelay_core::types::{DocumentId, UserId};
use docrelay_database::memory::MemoryNotificationStore;
use docrelay_database::{PresenceStore, Stores};
use docrelay_entity::presence::PresenceRecord;
use docrelay_realtime::message::{ActionKind, ViewerAction};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_document_viewed_without_record_reaches_admin() {
    let app = TestApp::new();

    let queued = app
        .realtime
        .handle_action(&ViewerAction::new("A", ActionKind::DocumentViewed, Some(DocumentId(7))))
        .await
        .unwrap();
    assert_eq!(queued, 1);

    let pushes = app.gateway.wait_for(1).await;
    let (to, envelope) = &pushes[0];
    assert_eq!(to, &Some(UserId::new("adm")));
    assert_eq!(envelope.destination, "/queue/action");
    assert_eq!(
        envelope.payload,
        json!({
            "typeMessage": "GETBOOKSVIWER",
            "senderId": "A",
            "receiverId": "adm",
            "user": {
                "id": "A",
                "username": "alice",
                "email": "alice@example.com",
                "isBlocked": false,
                "documentId": 7
            }
        })
    );
    app.gateway.assert_settled_at(1).await;
}

#[tokio::test]
async fn test_block_viewed_updates_record_and_notifies_both() {
    let app = TestApp::new();

    let response = app.request("PUT", "/api/documents/12/presence", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["blockedViewers"], json!([]));

    app.realtime
        .handle_action(&ViewerAction::new("A", ActionKind::BlockViewed, Some(DocumentId(12))))
        .await
        .unwrap();

    let pushes = app.gateway.wait_for(2).await;
    let recipients: Vec<_> = pushes.iter().map(|(to, _)| to.clone()).collect();
    assert_eq!(recipients, vec![Some(UserId::new("A")), Some(UserId::new("adm"))]);
    for (to, envelope) in &pushes {
        assert_eq!(envelope.payload["typeMessage"], "Bloc_VIEWED");
        assert_eq!(envelope.payload["senderId"], "A");
        assert_eq!(envelope.payload["receiverId"], json!(to.as_ref().map(|u| u.as_str())));
        assert_eq!(envelope.payload["documentId"], 12);
    }

    let response = app.request("GET", "/api/documents/12/presence", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["documentId"], 12);
    assert_eq!(response.body["data"]["blockedViewers"], json!(["A"]));
}

#[tokio::test]
async fn test_blocked_viewer_is_flagged_on_next_view() {
    let app = TestApp::new();
    app.request("PUT", "/api/documents/3/presence", None).await;

    app.realtime
        .handle_action(&ViewerAction::new("B", ActionKind::BlockViewed, Some(DocumentId(3))))
        .await
        .unwrap();
    app.gateway.wait_for(2).await;

    app.realtime
        .handle_action(&ViewerAction::new("B", ActionKind::DocumentViewed, Some(DocumentId(3))))
        .await
        .unwrap();
    let pushes = app.gateway.wait_for(3).await;
    let user = &pushes[2].1.payload["user"];
    assert_eq!(user["isBlocked"], true);
    assert_eq!(user["username"], "bob");
    assert!(user.get("email").is_none());
}

#[tokio::test]
async fn test_block_without_record_is_silent() {
    let app = TestApp::new();

    let queued = app
        .realtime
        .handle_action(&ViewerAction::new("A", ActionKind::BlockViewed, Some(DocumentId(99))))
        .await
        .unwrap();
    assert_eq!(queued, 0);
    app.gateway.assert_settled_at(0).await;

    let response = app.request("GET", "/api/documents/99/presence", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.stores.presence.find(DocumentId(99)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_close_and_unknown_actions() {
    let app = TestApp::new();

    app.realtime
        .handle_action(&ViewerAction::new("A", ActionKind::CloseViewers, None))
        .await
        .unwrap();
    let pushes = app.gateway.wait_for(1).await;
    assert_eq!(
        pushes[0].1.payload,
        json!({"typeMessage": "CLOSEBOOKSVIWER", "senderId": "A", "receiverId": "adm"})
    );

    for kind in [ActionKind::RequestViewers, ActionKind::Unknown] {
        let queued = app
            .realtime
            .handle_action(&ViewerAction::new("A", kind, Some(DocumentId(1))))
            .await
            .unwrap();
        assert_eq!(queued, 0);
    }
    app.gateway.assert_settled_at(1).await;
}

#[tokio::test]
async fn test_register_is_idempotent_over_http() {
    let app = TestApp::new();
    app.request("PUT", "/api/documents/5/presence", None).await;
    app.realtime
        .handle_action(&ViewerAction::new("A", ActionKind::BlockViewed, Some(DocumentId(5))))
        .await
        .unwrap();

    let response = app.request("PUT", "/api/documents/5/presence", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["blockedViewers"], json!(["A"]));
}

#[tokio::test]
async fn test_concurrent_blocks_keep_every_viewer() {
    let app = TestApp::new();
    app.request("PUT", "/api/documents/8/presence", None).await;

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let realtime = app.realtime.clone();
            tokio::spawn(async move {
                realtime
                    .handle_action(&ViewerAction::new(
                        format!("viewer-{i}"),
                        ActionKind::BlockViewed,
                        Some(DocumentId(8)),
                    ))
                    .await
                    .unwrap()
            })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap(), 2);
    }

    let record = app.stores.presence.find(DocumentId(8)).await.unwrap().unwrap();
    assert_eq!(record.blocked_viewers.len(), 20);
}

/// Presence store whose backend is unreachable.
#[derive(Debug)]
struct UnavailablePresenceStore;

#[async_trait]
impl PresenceStore for UnavailablePresenceStore {
    async fn find(&self, _document_id: DocumentId) -> AppResult<Option<PresenceRecord>> {
        Err(AppError::database("connection refused"))
    }

    async fn register(&self, _document_id: DocumentId) -> AppResult<PresenceRecord> {
        Err(AppError::database("connection refused"))
    }

    async fn add_blocked_viewer(
        &self,
        _document_id: DocumentId,
        _user_id: &UserId,
    ) -> AppResult<Option<PresenceRecord>> {
        Err(AppError::database("connection refused"))
    }
}

#[tokio::test]
async fn test_presence_store_failure_fails_action_without_push() {
    let app = TestApp::with_stores(Stores {
        presence: Arc::new(UnavailablePresenceStore),
        notifications: Arc::new(MemoryNotificationStore::new()),
        pool: None,
    });

    for kind in [ActionKind::BlockViewed, ActionKind::DocumentViewed] {
        let result = app
            .realtime
            .handle_action(&ViewerAction::new("A", kind, Some(DocumentId(4))))
            .await;
        assert!(result.is_err(), "{kind:?} should surface the store error");
    }
    app.gateway.assert_settled_at(0).await;

    let response = app.request("GET", "/api/documents/4/presence", None).await;
    assert!(response.status.is_server_error());
}
