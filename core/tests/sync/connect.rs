// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use tasksync_core::{
    AuthError, ConnectionState, DataVersion, ErrorKind, ListId, MemoryStore, RemoteError,
    RevisionStore, SyncCursor, SyncEngine, SyncError, SyncReport,
};
use tokio_util::sync::CancellationToken;

use crate::common::{
    FakeFactory, FakeRemote, NoteMapper, TestCredentials, cached_note, test_config, test_engine,
    test_engine_with, ts,
};

#[tokio::test]
async fn connect_adopts_first_list_when_unconfigured() {
    let remote = FakeRemote::with_lists(&["L1", "L2"]);
    let mut engine = test_engine(&remote, None);

    let state = engine.connect(&CancellationToken::new()).await.unwrap();
    assert_eq!(state, ConnectionState::Connected(ListId::from("L1")));
    assert_eq!(engine.state(), &state);
}

#[tokio::test]
async fn connect_prefers_configured_list() {
    let remote = FakeRemote::with_lists(&["L1", "L2"]);
    let mut engine = test_engine(&remote, Some("gtasks::L2"));

    engine.connect(&CancellationToken::new()).await.unwrap();
    assert_eq!(engine.list(), Some(&ListId::from("L2")));
}

#[tokio::test]
async fn connect_falls_back_to_default_list() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.fail_lists(Some(RemoteError::InvalidPayload("garbage".to_string())));
    let mut engine = test_engine(&remote, None);

    engine.connect(&CancellationToken::new()).await.unwrap();
    assert_eq!(engine.list(), Some(&ListId::default_list()));
}

#[tokio::test]
async fn connect_reuses_session() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();

    engine.connect(&cancel).await.unwrap();
    engine.connect(&cancel).await.unwrap();
    assert_eq!(remote.calls().query_lists, 1);
}

#[tokio::test]
async fn rejected_credentials_are_invalidated() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let credentials = TestCredentials::rejected();
    let mut engine = test_engine_with(&remote, Some("L1"), credentials.clone());

    let err = engine.connect(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, SyncError::Auth(AuthError::AuthRejected(_))));
    assert_eq!(err.kind(), ErrorKind::AuthRejected);
    assert!(!err.is_retryable());
    assert_eq!(engine.state(), &ConnectionState::Disconnected);
    assert_eq!(credentials.invalidated(), 1);
    assert_eq!(remote.calls().network(), 0);
}

#[tokio::test]
async fn network_failure_while_listing_aborts_connect() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.fail_lists(Some(RemoteError::TransientNetwork("timeout".to_string())));
    let mut engine = test_engine(&remote, Some("L1"));

    let err = engine.connect(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientNetwork);
    assert!(err.is_retryable());
    assert_eq!(engine.state(), &ConnectionState::Disconnected);
    assert!(engine.list().is_none());
}

#[tokio::test]
async fn disconnect_is_safe_in_any_state() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = test_engine(&remote, Some("L1"));

    engine.disconnect();
    assert_eq!(engine.state(), &ConnectionState::Disconnected);

    engine.connect(&CancellationToken::new()).await.unwrap();
    engine.disconnect();
    engine.disconnect();
    assert_eq!(engine.state(), &ConnectionState::Disconnected);
}

#[tokio::test]
async fn sync_reconnects_when_configured_list_changes() {
    let remote = FakeRemote::with_lists(&["L1", "L2"]);
    remote.put("L2", "b", "Call mom");
    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();

    engine.sync(&cancel).await.unwrap();
    assert!(!engine.requires_reconnect());

    engine.set_configured_list(Some(ListId::from("L2")));
    assert!(engine.requires_reconnect());

    engine.sync(&cancel).await.unwrap();
    assert_eq!(engine.list(), Some(&ListId::from("L2")));
    assert!(!engine.requires_reconnect());
    assert_eq!(remote.calls().query_lists, 2);
    assert!(
        engine
            .store()
            .get_cursor(&ListId::from("L2"))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn default_list_session_is_not_repointed() {
    let remote = FakeRemote::with_lists(&[]);
    let mut engine = test_engine(&remote, None);
    engine.connect(&CancellationToken::new()).await.unwrap();

    engine.set_configured_list(Some(ListId::from("L2")));
    assert!(!engine.requires_reconnect());
}

#[tokio::test]
async fn list_lists_returns_remote_lists() {
    let remote = FakeRemote::with_lists(&["L1", "L2"]);
    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();

    assert!(engine.list_lists(&cancel).await.is_err());

    engine.connect(&cancel).await.unwrap();
    let lists = engine.list_lists(&cancel).await.unwrap();
    let ids: Vec<_> = lists.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["L1", "L2"]);
}

#[tokio::test]
async fn repointing_drops_items_of_the_previous_list() {
    let remote = FakeRemote::with_lists(&["L1", "L2"]);
    remote.scope_items_by_list();
    remote.put("L1", "a", "Buy milk");
    remote.put("L2", "b", "Call mom");
    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();

    engine.sync(&cancel).await.unwrap();
    assert!(engine.store().has_item("a").await.unwrap());

    engine.set_configured_list(Some(ListId::from("L2")));
    let report = engine.sync(&cancel).await.unwrap();
    assert_eq!(
        report,
        SyncReport::Applied {
            created: 1,
            modified: 0,
            removed: 0
        }
    );

    let ids: Vec<_> = engine.store().items().await.into_iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["b"]);
    let store = engine.store();
    assert!(store.get_cursor(&ListId::from("L1")).await.unwrap().is_none());
    assert_eq!(store.bound_list().await.unwrap(), Some(ListId::from("L2")));
}

#[tokio::test]
async fn store_of_another_list_is_cleared_on_connect() {
    let remote = FakeRemote::with_lists(&["L1", "L2"]);
    let store = MemoryStore::new();
    let old = ListId::from("L1");
    store.bind_list(&old).await.unwrap();
    store
        .put_item(&cached_note("a", "Buy milk", ts(1), ts(0)))
        .await
        .unwrap();
    let cursor = SyncCursor::from_timestamp(ts(1));
    store
        .put_cursor(&old, &cursor, DataVersion::CURRENT)
        .await
        .unwrap();

    let mut engine = SyncEngine::new(
        &test_config(Some("L2")),
        FakeFactory::new(remote.clone()),
        TestCredentials::valid(),
        store,
        NoteMapper,
    );
    engine.connect(&CancellationToken::new()).await.unwrap();

    let store = engine.store();
    assert!(store.is_empty().await);
    assert!(store.get_cursor(&old).await.unwrap().is_none());
    assert_eq!(store.bound_list().await.unwrap(), Some(ListId::from("L2")));
}

#[tokio::test]
async fn store_of_the_same_list_is_kept_on_connect() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = test_engine(&remote, Some("L1"));
    let list = ListId::from("L1");
    engine.store().bind_list(&list).await.unwrap();
    engine
        .store()
        .put_item(&cached_note("a", "Buy milk", ts(1), ts(0)))
        .await
        .unwrap();

    engine.connect(&CancellationToken::new()).await.unwrap();
    assert!(engine.store().has_item("a").await.unwrap());
    assert_eq!(engine.store().bound_list().await.unwrap(), Some(list));
}
