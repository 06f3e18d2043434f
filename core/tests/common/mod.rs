// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - A scripted in-memory remote and its credentials
//! - Test data factories (fixtures)
//! - Custom assertion helpers
//! - Temporary directory management with auto-cleanup

mod assertions;
mod fixtures;

use std::sync::Arc;

use tasksync_core::{MemoryStore, SyncEngine};

#[allow(unused_imports)]
pub use assertions::{assert_counts, expect_changed};
#[allow(unused_imports)]
pub use fakes::{Calls, FakeFactory, FakeRemote, ScriptedClient, TestCredentials};
#[allow(unused_imports)]
pub use fixtures::{Note, NoteMapper, cached_note, test_config, ts};
#[allow(unused_imports)]
pub use temp_dir::{TempState, setup_temp_state};

/// Engine over the fake remote and an in-memory store.
pub type TestEngine = SyncEngine<FakeFactory, MemoryStore<Note>, NoteMapper>;

/// Creates a disconnected engine for `list_id` over `remote`.
#[allow(dead_code)]
pub fn test_engine(remote: &FakeRemote, list_id: Option<&str>) -> TestEngine {
    SyncEngine::new(
        &test_config(list_id),
        FakeFactory::new(remote.clone()),
        TestCredentials::valid(),
        MemoryStore::new(),
        NoteMapper,
    )
}

/// Creates an engine with the given credentials.
#[allow(dead_code)]
pub fn test_engine_with(
    remote: &FakeRemote,
    list_id: Option<&str>,
    credentials: Arc<TestCredentials>,
) -> TestEngine {
    SyncEngine::new(
        &test_config(list_id),
        FakeFactory::new(remote.clone()),
        credentials,
        MemoryStore::new(),
        NoteMapper,
    )
}
