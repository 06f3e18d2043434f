// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use tasksync_core::{
    DataVersion, ErrorKind, ListId, MemoryStore, Operation, PollOutcome, RemoteError,
    RevisionStore, SyncConfig, SyncEngine, SyncError, SyncReport,
};
use tokio_util::sync::CancellationToken;

use crate::common::{
    FakeFactory, FakeRemote, NoteMapper, TestCredentials, assert_counts, cached_note,
    expect_changed, test_engine, ts,
};

fn list() -> ListId {
    ListId::from("L1")
}

#[tokio::test]
async fn scenario_a_fresh_cache_creates_everything_then_settles() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");
    remote.put("L1", "b", "Call mom");
    remote.put("L1", "c", "Water plants");

    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.connect(&cancel).await.unwrap();

    let PollOutcome::Changed { changes, cursor } = engine.poll(&cancel).await.unwrap() else {
        panic!("first poll should report changes");
    };
    assert_counts(&changes, 3, 0, 0);
    engine.apply(&changes).await.unwrap();
    engine.commit(&cursor.expect("list has an update time")).await.unwrap();

    let before = remote.calls();
    assert_eq!(engine.poll(&cancel).await.unwrap(), PollOutcome::Unchanged);
    assert_eq!(remote.calls().query_items, before.query_items);
    assert_eq!(engine.store().len().await, 3);
}

#[tokio::test]
async fn unchanged_poll_is_idempotent_and_queries_no_items() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");

    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.sync(&cancel).await.unwrap();

    let before = remote.calls();
    assert_eq!(engine.poll(&cancel).await.unwrap(), PollOutcome::Unchanged);
    assert_eq!(engine.poll(&cancel).await.unwrap(), PollOutcome::Unchanged);
    assert_eq!(engine.sync(&cancel).await.unwrap(), SyncReport::Unchanged);

    let after = remote.calls();
    assert_eq!(after.query_items, before.query_items);
    assert_eq!(after.get_list, before.get_list + 3);
}

#[tokio::test]
async fn scenario_b_new_revision_is_modified_and_keeps_first_seen() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let updated = remote.put("L1", "x1", "Buy oat milk");

    let mut engine = test_engine(&remote, Some("L1"));
    engine
        .store()
        .put_item(&cached_note("x1", "Buy milk", ts(-100), ts(-500)))
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    engine.connect(&cancel).await.unwrap();
    let changes = expect_changed(engine.poll(&cancel).await.unwrap());

    assert_counts(&changes, 0, 1, 0);
    let item = &changes.modified[0];
    assert_eq!(item.id, "x1");
    assert_eq!(item.payload.title, "Buy oat milk");
    assert_eq!(item.payload.updated, Some(updated));
    assert_eq!(item.payload.created, Some(ts(-500)));
}

#[tokio::test]
async fn equal_revision_is_not_reported() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let updated = remote.put("L1", "x1", "Buy milk");

    let mut engine = test_engine(&remote, Some("L1"));
    engine
        .store()
        .put_item(&cached_note("x1", "Buy milk", updated, updated))
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    engine.connect(&cancel).await.unwrap();
    let changes = expect_changed(engine.poll(&cancel).await.unwrap());
    assert!(changes.is_empty(), "{changes:?}");
}

#[tokio::test]
async fn scenario_c_refused_bound_falls_back_once_and_sticks() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");

    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.sync(&cancel).await.unwrap();
    assert!(!engine.degraded_query());

    remote.reject_bounded_queries();
    remote.put("L1", "b", "Call mom");
    let seen = remote.queries().len();

    let changes = expect_changed(engine.poll(&cancel).await.unwrap());
    assert_counts(&changes, 1, 0, 0);
    assert_eq!(changes.created[0].id, "b");

    let queries = remote.queries();
    let queries = &queries[seen..];
    assert_eq!(queries.len(), 2);
    assert!(queries[0].updated_min.is_some());
    assert!(queries[0].show_deleted);
    assert!(queries[1].updated_min.is_none());
    assert!(!queries[1].show_deleted);
    assert!(engine.degraded_query());

    // the next poll goes straight to the unbounded query
    remote.put("L1", "c", "Water plants");
    let seen = remote.queries().len();
    let changes = expect_changed(engine.poll(&cancel).await.unwrap());
    assert_eq!(changes.created.len(), 2);

    let queries = remote.queries();
    let queries = &queries[seen..];
    assert_eq!(queries.len(), 1);
    assert!(queries[0].updated_min.is_none());
}

#[tokio::test]
async fn fallback_flag_is_dropped_on_disconnect() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");

    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.sync(&cancel).await.unwrap();

    remote.reject_bounded_queries();
    remote.touch_list("L1");
    engine.poll(&cancel).await.unwrap();
    assert!(engine.degraded_query());

    engine.disconnect();
    engine.connect(&cancel).await.unwrap();
    assert!(!engine.degraded_query());
}

#[tokio::test]
async fn other_errors_do_not_trigger_the_fallback() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");

    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.sync(&cancel).await.unwrap();

    remote.touch_list("L1");
    remote.fail_items(Some(RemoteError::Other("HTTP 400".to_string())));
    let seen = remote.queries().len();

    let err = engine.poll(&cancel).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
    assert_eq!(remote.queries().len(), seen + 1);
    assert!(!engine.degraded_query());
}

#[tokio::test]
async fn tombstones_are_reported_every_time_and_apply_idempotently() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");
    remote.put("L1", "b", "Call mom");

    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.sync(&cancel).await.unwrap();

    remote.tombstone("L1", "a");
    for _ in 0..2 {
        // apply without committing the cursor, so the tombstone comes back
        let changes = expect_changed(engine.poll(&cancel).await.unwrap());
        assert_counts(&changes, 0, 0, 1);
        assert_eq!(changes.removed, vec!["a".to_string()]);
        engine.apply(&changes).await.unwrap();
    }

    assert_eq!(engine.store().len().await, 1);
    assert!(!engine.store().has_item("a").await.unwrap());
}

#[tokio::test]
async fn failed_poll_leaves_cursor_untouched() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");

    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.sync(&cancel).await.unwrap();
    let before = engine.store().get_cursor(&list()).await.unwrap();
    assert!(before.is_some());

    remote.put("L1", "b", "Call mom");
    remote.fail_items(Some(RemoteError::TransientNetwork("reset".to_string())));

    let err = engine.sync(&cancel).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientNetwork);
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        SyncError::Remote {
            operation: Operation::Poll,
            ref list,
            ..
        } if list.as_str() == "L1"
    ));

    assert_eq!(engine.store().get_cursor(&list()).await.unwrap(), before);
    assert!(!engine.store().has_item("b").await.unwrap());
}

#[tokio::test]
async fn cancelled_poll_writes_nothing() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");

    let mut engine = test_engine(&remote, Some("L1"));
    engine.connect(&CancellationToken::new()).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(engine.poll(&cancel).await.unwrap(), PollOutcome::Cancelled);
    assert_eq!(engine.sync(&cancel).await.unwrap(), SyncReport::Cancelled);

    assert!(engine.store().get_cursor(&list()).await.unwrap().is_none());
    assert!(engine.store().is_empty().await);
    assert_eq!(remote.calls().query_items, 0);
}

#[tokio::test]
async fn cancel_between_pages_writes_nothing() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");
    remote.put("L1", "b", "Call mom");
    remote.put("L1", "c", "Water plants");

    let config = SyncConfig {
        list_id: Some("L1".to_string()),
        page_size: 1,
        state_dir: None,
    };
    let mut engine = SyncEngine::new(
        &config,
        FakeFactory::new(remote.clone()),
        TestCredentials::valid(),
        MemoryStore::new(),
        NoteMapper,
    );
    let cancel = CancellationToken::new();
    engine.connect(&cancel).await.unwrap();
    remote.cancel_after_pages(1, cancel.clone());

    assert_eq!(engine.sync(&cancel).await.unwrap(), SyncReport::Cancelled);
    assert!(cancel.is_cancelled());
    assert_eq!(remote.calls().query_items, 1);
    assert!(engine.store().get_cursor(&list()).await.unwrap().is_none());
    assert!(engine.store().is_empty().await);

    // a fresh token resumes from scratch
    let report = engine.sync(&CancellationToken::new()).await.unwrap();
    assert_eq!(
        report,
        SyncReport::Applied {
            created: 3,
            modified: 0,
            removed: 0
        }
    );
}

#[tokio::test]
async fn stale_data_version_forces_full_poll() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");

    let mut engine = test_engine(&remote, Some("L1"));
    let cancel = CancellationToken::new();
    engine.sync(&cancel).await.unwrap();

    let (cursor, _) = engine.store().get_cursor(&list()).await.unwrap().unwrap();
    engine
        .store()
        .put_cursor(&list(), &cursor, DataVersion(1))
        .await
        .unwrap();

    let seen = remote.queries().len();
    let changes = expect_changed(engine.poll(&cancel).await.unwrap());
    assert!(changes.is_empty());

    let queries = remote.queries();
    assert_eq!(queries.len(), seen + 1);
    assert!(queries[seen].updated_min.is_none());

    // the next commit restores the current version
    engine.sync(&cancel).await.unwrap();
    let (_, version) = engine.store().get_cursor(&list()).await.unwrap().unwrap();
    assert_eq!(version, DataVersion::CURRENT);
}

#[tokio::test]
async fn default_list_always_polls_everything() {
    let remote = FakeRemote::with_lists(&[]);
    remote.put("L1", "a", "Buy milk");

    let mut engine = test_engine(&remote, None);
    let cancel = CancellationToken::new();
    engine.connect(&cancel).await.unwrap();
    assert_eq!(engine.list(), Some(&ListId::default_list()));

    for _ in 0..2 {
        let PollOutcome::Changed { cursor, .. } = engine.poll(&cancel).await.unwrap() else {
            panic!("the default list never reports unchanged");
        };
        assert!(cursor.is_none());
    }
    assert_eq!(remote.calls().get_list, 0);
    assert_eq!(remote.calls().query_items, 2);
}

#[tokio::test]
async fn pagination_follows_tokens() {
    let remote = FakeRemote::with_lists(&["L1"]);
    for i in 0..5 {
        remote.put("L1", &format!("t{i}"), &format!("Task {i}"));
    }

    let config = SyncConfig {
        list_id: Some("L1".to_string()),
        page_size: 2,
        state_dir: None,
    };
    let mut engine = SyncEngine::new(
        &config,
        FakeFactory::new(remote.clone()),
        TestCredentials::valid(),
        MemoryStore::new(),
        NoteMapper,
    );
    let cancel = CancellationToken::new();

    let report = engine.sync(&cancel).await.unwrap();
    assert_eq!(
        report,
        SyncReport::Applied {
            created: 5,
            modified: 0,
            removed: 0
        }
    );

    let queries = remote.queries();
    let tokens: Vec<_> = queries.iter().map(|a| a.page_token.as_deref()).collect();
    assert_eq!(tokens, vec![None, Some("2"), Some("4")]);
    assert!(queries.iter().all(|a| a.max_results == 2));
}

#[tokio::test]
async fn poll_requires_connection() {
    let remote = FakeRemote::with_lists(&["L1"]);
    let mut engine = test_engine(&remote, Some("L1"));

    let err = engine.poll(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, SyncError::NotConnected(Operation::Poll)));
    assert_eq!(err.kind(), ErrorKind::NotConnected);
    assert_eq!(remote.calls().network(), 0);
}
