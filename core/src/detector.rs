// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Remote change detection.
//!
//! A poll first compares the list's own update time with the stored cursor,
//! and only enumerates items when they differ. Enumeration is windowed by the
//! cursor when possible, and degrades to full queries for the rest of the
//! connection if the server refuses the window.

use jiff::Timestamp;
use tokio_util::sync::CancellationToken;

use crate::authorizer::Session;
use crate::error::RemoteError;
use crate::remote::RemoteListClient;
use crate::types::{ItemQuery, ListId, RemoteItem, SyncCursor};

/// Outcome of change detection.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// The list did not change since the cursor; no items were queried.
    Unchanged,
    /// The list changed.
    Changed {
        /// Raw items, in server order.
        items: Vec<RemoteItem>,
        /// Cursor to commit once the items are applied.
        cursor: Option<SyncCursor>,
    },
}

/// Decides if and what changed on a remote list.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    page_size: u32,
}

impl ChangeDetector {
    /// Creates a detector requesting `page_size` items per page.
    #[must_use]
    pub const fn new(page_size: u32) -> Self {
        Self { page_size }
    }

    /// Detects changes since `last_cursor`.
    ///
    /// `data_version_ok` is false when the cursor was written under other
    /// semantics, which forces a full enumeration.
    ///
    /// # Errors
    ///
    /// Returns the client's error, or [`RemoteError::Cancelled`]. No cursor is
    /// produced in either case.
    pub async fn detect<C: RemoteListClient>(
        &self,
        session: &mut Session<C>,
        last_cursor: Option<&SyncCursor>,
        data_version_ok: bool,
        cancel: &CancellationToken,
    ) -> Result<Detection, RemoteError> {
        let list = session.list().clone();
        let last_time = last_cursor.and_then(SyncCursor::timestamp);

        // the sentinel list has no metadata of its own to compare against
        let list_time = if list.is_default() {
            None
        } else {
            session.client().get_list(&list, cancel).await?.updated
        };

        if data_version_ok {
            if let (Some(list_time), Some(last_time)) = (list_time, last_time) {
                if list_time == last_time {
                    tracing::debug!(%list, "list unchanged since last poll");
                    return Ok(Detection::Unchanged);
                }
            }
        }

        let since = if data_version_ok && !session.degraded_query() {
            last_time
        } else {
            None
        };

        let items = match self
            .enumerate(session.client(), &list, since, cancel)
            .await
        {
            Err(RemoteError::MalformedQueryParameter(msg)) if since.is_some() => {
                tracing::info!(%list, reason = %msg, "bounded item query refused, using full queries");
                session.set_degraded_query();
                self.enumerate(session.client(), &list, None, cancel)
                    .await?
            }
            res => res?,
        };

        tracing::debug!(%list, count = items.len(), bounded = since.is_some(), "list changed");
        Ok(Detection::Changed {
            items,
            cursor: list_time.map(SyncCursor::from_timestamp),
        })
    }

    async fn enumerate<C: RemoteListClient>(
        &self,
        client: &C,
        list: &ListId,
        since: Option<Timestamp>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteItem>, RemoteError> {
        let mut query = ItemQuery {
            updated_min: since,
            // a full enumeration reflects current state only
            show_deleted: since.is_some(),
            max_results: self.page_size,
            page_token: None,
        };

        let mut items = Vec::new();
        loop {
            if cancel.is_cancelled() {
                return Err(RemoteError::Cancelled);
            }

            let page = client.query_items(list, &query, cancel).await?;
            tracing::debug!(%list, count = page.items.len(), "fetched page");
            if page.items.is_empty() {
                break;
            }

            items.extend(page.items);
            match page.next_page_token {
                Some(token) => query.page_token = Some(token),
                None => break,
            }
        }

        if cancel.is_cancelled() {
            return Err(RemoteError::Cancelled);
        }
        Ok(items)
    }
}
