// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use tasksync_core::{ErrorKind, Operation, RevisionStore, SyncError};
use tokio_util::sync::CancellationToken;

use crate::common::{FakeRemote, Note, TestEngine, cached_note, test_engine, ts};

async fn synced_engine(remote: &FakeRemote) -> TestEngine {
    let mut engine = test_engine(remote, Some("L1"));
    engine.sync(&CancellationToken::new()).await.unwrap();
    engine
}

#[tokio::test]
async fn scenario_d_load_after_create_needs_no_network() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.connect(&cancel).await.unwrap();

    let saved = engine
        .save(&Note::draft("Buy milk"), false, &cancel)
        .await
        .unwrap();
    assert_eq!(saved.id, "srv-1");
    assert_eq!(saved.payload.title, "Buy milk");
    assert!(saved.revision.is_some());

    let before = remote.calls();
    let loaded = engine.load(&saved.id).await.unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(remote.calls(), before);
    let stored = engine.store().get_item(&saved.id).await.unwrap();
    assert_eq!(stored, Some(saved));
}

#[tokio::test]
async fn preload_is_consumed_at_most_once() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.connect(&cancel).await.unwrap();

    let saved = engine
        .save(&Note::draft("Buy milk"), false, &cancel)
        .await
        .unwrap();
    engine.load(&saved.id).await.unwrap();

    let err = engine.load(&saved.id).await.unwrap_err();
    assert!(matches!(err, SyncError::NotFound { ref id } if id == "srv-1"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn load_without_save_is_not_found() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");
    let mut engine = synced_engine(&remote).await;

    // cached by a poll, but never saved in this session
    let err = engine.load("a").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn create_item_saves_and_loads() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.connect(&cancel).await.unwrap();

    let item = engine
        .create_item(&Note::draft("Call mom"), &cancel)
        .await
        .unwrap();
    assert_eq!(remote.calls().insert, 1);
    assert!(engine.store().has_item(&item.id).await.unwrap());
    assert!(engine.load(&item.id).await.is_err());
}

#[tokio::test]
async fn modify_item_keeps_first_seen_and_skips_move() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let first_seen = remote.put("L1", "a", "Buy milk");
    let mut engine = synced_engine(&remote).await;
    let cancel = CancellationToken::new();

    let mut note = engine.cached("a").await.unwrap().unwrap().payload;
    note.title = "Buy oat milk".to_string();

    let item = engine.modify_item(&note, &cancel).await.unwrap();
    assert_eq!(item.payload.title, "Buy oat milk");
    assert_eq!(item.payload.created, Some(first_seen));
    assert_ne!(item.payload.updated, Some(first_seen));

    let calls = remote.calls();
    assert_eq!(calls.update, 1);
    assert_eq!(calls.moves, 0);

    let cached = engine.cached("a").await.unwrap().unwrap();
    assert_eq!(cached, item);
}

#[tokio::test]
async fn update_with_new_parent_moves_item() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "p", "Groceries");
    remote.put("L1", "a", "Buy milk");
    let mut engine = synced_engine(&remote).await;
    let cancel = CancellationToken::new();

    let mut note = engine.cached("a").await.unwrap().unwrap().payload;
    note.parent = Some("p".to_string());

    let item = engine.save(&note, true, &cancel).await.unwrap();
    assert_eq!(item.payload.parent.as_deref(), Some("p"));
    assert_eq!(remote.calls().moves, 1);
    assert_eq!(remote.item("a").unwrap().parent.as_deref(), Some("p"));
}

#[tokio::test]
async fn update_requires_item_id() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = synced_engine(&remote).await;

    let err = engine
        .save(&Note::draft("Buy milk"), true, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPayload);
    assert_eq!(remote.calls().update, 0);
}

#[tokio::test]
async fn failed_update_leaves_store_untouched() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = synced_engine(&remote).await;
    let ghost = cached_note("ghost", "Gone", ts(-10), ts(-20));
    engine.store().put_item(&ghost).await.unwrap();

    let mut note = ghost.payload.clone();
    note.title = "Back".to_string();
    let err = engine
        .save(&note, true, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Remote {
            operation: Operation::Save,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(engine.store().get_item("ghost").await.unwrap(), Some(ghost));
}

#[tokio::test]
async fn remove_deletes_remotely_then_locally() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");
    remote.put("L1", "b", "Call mom");
    let mut engine = synced_engine(&remote).await;

    engine.remove("a", &CancellationToken::new()).await.unwrap();
    assert_eq!(remote.calls().delete, 1);
    assert_eq!(remote.item_count(), 1);
    assert!(!engine.store().has_item("a").await.unwrap());
    assert!(engine.store().has_item("b").await.unwrap());
}

#[tokio::test]
async fn remove_treats_protocol_quirk_as_success() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");
    remote.delete_quirk();
    let mut engine = synced_engine(&remote).await;

    engine.remove("a", &CancellationToken::new()).await.unwrap();
    assert!(!engine.store().has_item("a").await.unwrap());
}

#[tokio::test]
async fn failed_remove_leaves_store_untouched() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = synced_engine(&remote).await;
    let ghost = cached_note("ghost", "Gone", ts(-10), ts(-20));
    engine.store().put_item(&ghost).await.unwrap();

    let err = engine
        .remove("ghost", &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(engine.store().has_item("ghost").await.unwrap());
}

#[tokio::test]
async fn remove_unknown_item_makes_no_request() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = synced_engine(&remote).await;

    let err = engine
        .remove("missing", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound { .. }));
    assert_eq!(remote.calls().delete, 0);
}

#[tokio::test]
async fn remove_drops_pending_preload() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = synced_engine(&remote).await;
    let cancel = CancellationToken::new();

    let saved = engine
        .save(&Note::draft("Buy milk"), false, &cancel)
        .await
        .unwrap();
    engine.store().put_item(&saved).await.unwrap();

    engine.remove(&saved.id, &cancel).await.unwrap();
    assert_eq!(
        engine.load(&saved.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn disconnect_drops_pending_preload() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = synced_engine(&remote).await;

    let saved = engine
        .save(&Note::draft("Buy milk"), false, &CancellationToken::new())
        .await
        .unwrap();
    engine.disconnect();
    assert!(engine.load(&saved.id).await.is_err());
}

#[tokio::test]
async fn writes_require_connection() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();

    let err = engine
        .save(&Note::draft("Buy milk"), false, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotConnected(Operation::Save)));

    let err = engine.remove("a", &cancel).await.unwrap_err();
    assert!(matches!(err, SyncError::NotConnected(Operation::Remove)));
    assert_eq!(remote.calls().network(), 0);
}
