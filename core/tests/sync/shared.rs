// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tasksync_core::{MemoryStore, SharedEngine, SyncEngine, SyncReport};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::common::{FakeFactory, FakeRemote, NoteMapper, TestCredentials, test_config};

#[tokio::test]
async fn second_sync_short_circuits_while_first_runs() {
    let remote = FakeRemote::with_lists(&["L1"]);
    remote.put("L1", "a", "Buy milk");

    let gate = Arc::new(Notify::new());
    let engine = SyncEngine::new(
        &test_config(Some("L1")),
        FakeFactory::gated(remote.clone(), gate.clone()),
        TestCredentials::valid(),
        MemoryStore::new(),
        NoteMapper,
    );
    let shared = SharedEngine::new(engine);
    let cancel = CancellationToken::new();

    let (first, second) = tokio::join!(shared.sync(&cancel), async {
        // the first sync is parked on the gate while holding the engine
        let report = shared.sync(&cancel).await;
        gate.notify_one();
        report
    });

    assert_eq!(second.unwrap(), SyncReport::AlreadyRunning);
    assert_eq!(
        first.unwrap(),
        SyncReport::Applied {
            created: 1,
            modified: 0,
            removed: 0
        }
    );

    // the flag is released once the first sync is done
    assert_eq!(shared.sync(&cancel).await.unwrap(), SyncReport::Unchanged);
    assert_eq!(shared.lock().await.store().len().await, 1);
}
