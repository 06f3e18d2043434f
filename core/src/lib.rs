// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Incremental synchronization of a local cache with a remote task list.
//!
//! The [`SyncEngine`] connects through an [`Authorizer`], asks the remote list
//! what changed since the last committed [`SyncCursor`], classifies the
//! answer against the [`RevisionStore`], and hands single-item writes back to
//! the caller through the [`SaveLoadCoordinator`].

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
#![allow(clippy::module_name_repetitions, clippy::missing_panics_doc)]

mod authorizer;
mod classifier;
mod config;
mod coordinator;
mod detector;
mod engine;
mod error;
#[cfg(any(feature = "sqlite", feature = "sqlite-unbundled"))]
mod localdb;
mod mapper;
mod reconnect;
mod remote;
mod store;
mod types;

#[cfg(any(feature = "sqlite", feature = "sqlite-unbundled"))]
pub use crate::localdb::SqliteStore;
pub use crate::{
    authorizer::{Authorizer, Session},
    classifier::classify,
    config::{APP_NAME, SyncConfig, expand_path, get_config_dir},
    coordinator::SaveLoadCoordinator,
    detector::{ChangeDetector, Detection},
    engine::{PollOutcome, SharedEngine, SyncEngine, SyncReport},
    error::{AuthError, ErrorKind, Operation, RemoteError, StoreError, SyncError},
    mapper::DomainMapper,
    reconnect::requires_reconnect,
    remote::{AccessToken, CredentialProvider, RemoteListClient, SessionFactory, cancellable},
    store::{MemoryStore, RevisionStore},
    types::{
        AuthoritativeItem, CachedItem, ChangeSet, ConnectionState, DataVersion, ItemQuery,
        ListId, ListSummary, Page, RemoteItem, RemotePayload, Revision, SyncCursor,
    },
};
