// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use crate::mapper::DomainMapper;
use crate::types::{CachedItem, ChangeSet, RemoteItem};

/// Classifies polled items against the cache.
///
/// `lookup` returns the cached version of an id. A later occurrence of the
/// same id supersedes earlier ones, and items without an id are ignored.
/// Tombstones are removals whether cached or not, and cached items whose
/// revision did not change are left out.
pub fn classify<M, L>(mapper: &M, items: Vec<RemoteItem>, mut lookup: L) -> ChangeSet<M::Payload>
where
    M: DomainMapper + ?Sized,
    L: FnMut(&str) -> Option<CachedItem<M::Payload>>,
{
    let mut changes = ChangeSet::default();
    for item in dedup_last_wins(items) {
        if item.deleted {
            changes.removed.push(item.id);
            continue;
        }

        let mut payload = match mapper.from_remote(&item) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(id = %item.id, err = %e, "skipping item that cannot be mapped");
                continue;
            }
        };
        let revision = mapper.revision(&payload);

        match lookup(&item.id) {
            None => changes.created.push(CachedItem {
                id: item.id,
                revision,
                payload,
            }),
            Some(cached) if revision.is_some() && cached.revision == revision => {
                tracing::trace!(id = %item.id, "item unchanged");
            }
            Some(cached) => {
                mapper.carry_forward(&mut payload, &cached.payload);
                changes.modified.push(CachedItem {
                    id: item.id,
                    revision,
                    payload,
                });
            }
        }
    }

    tracing::debug!(
        created = changes.created.len(),
        modified = changes.modified.len(),
        removed = changes.removed.len(),
        "classified items"
    );
    changes
}

fn dedup_last_wins(items: Vec<RemoteItem>) -> Vec<RemoteItem> {
    let mut seen = HashSet::new();
    let mut unique: Vec<_> = items
        .into_iter()
        .rev()
        .filter(|a| !a.id.is_empty() && seen.insert(a.id.clone()))
        .collect();
    unique.reverse();
    unique
}
