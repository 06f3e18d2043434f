// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

use jiff::Timestamp;

/// Identity of a remote list.
///
/// A `ListId` names the list a session is bound to, such as the id of a task
/// list on the remote service. The [`ListId::DEFAULT`] sentinel is used when
/// no list could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ListId(String);

impl ListId {
    /// Sentinel for "the server's default list".
    pub const DEFAULT: &str = "@default";

    /// Creates a new `ListId` from a string.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// The sentinel default list.
    #[must_use]
    pub fn default_list() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Parses a configured identity, stripping a backend prefix such as
    /// `gtasks::`. Returns `None` for an empty identity.
    #[must_use]
    pub fn from_configured(id: &str) -> Option<Self> {
        let id = id.trim();
        let id = id.split_once("::").map_or(id, |(_, rest)| rest);
        (!id.is_empty()).then(|| Self(id.to_string()))
    }

    /// Whether this is the [`ListId::DEFAULT`] sentinel.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ListId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ListId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ListId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ListId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Revision marker of a cached item.
///
/// Two revisions are compared for equality only, a differing revision means
/// the item changed on the server.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Creates a new `Revision` from a string.
    #[must_use]
    pub const fn new(revision: String) -> Self {
        Self(revision)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Revision {
    fn from(revision: String) -> Self {
        Self(revision)
    }
}

impl From<&str> for Revision {
    fn from(revision: &str) -> Self {
        Self(revision.to_string())
    }
}

/// Marks "everything up to this point has been seen" for a remote list.
///
/// The cursor is the RFC 3339 rendering of the list's last-updated time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SyncCursor(String);

impl SyncCursor {
    /// Creates a cursor from its stored string form.
    #[must_use]
    pub const fn new(cursor: String) -> Self {
        Self(cursor)
    }

    /// Creates a cursor for the given list update time.
    #[must_use]
    pub fn from_timestamp(ts: Timestamp) -> Self {
        Self(ts.to_string())
    }

    /// Decodes the timestamp carried by the cursor.
    ///
    /// A cursor that does not decode is treated as carrying no lower bound.
    #[must_use]
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.0.parse().ok()
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Generation of the semantics a cursor was produced under.
///
/// A stored version different from [`DataVersion::CURRENT`] invalidates the
/// stored cursor and forces a full re-poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataVersion(pub u32);

impl DataVersion {
    /// Version written by this engine.
    pub const CURRENT: Self = Self(2);

    /// Whether the stored version matches [`DataVersion::CURRENT`].
    #[must_use]
    pub fn is_current(self) -> bool {
        self == Self::CURRENT
    }
}

impl fmt::Display for DataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Summary of one remote list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSummary {
    /// The list identity.
    pub id: ListId,
    /// Human readable title.
    pub title: Option<String>,
    /// Last time anything in the list changed.
    pub updated: Option<Timestamp>,
}

/// Point-in-time snapshot of one remote item.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteItem {
    /// Unique id of the item.
    pub id: String,
    /// Last time the item was updated on the server.
    pub updated: Option<Timestamp>,
    /// Whether the item is a tombstone.
    pub deleted: bool,
    /// Id of the parent item, for nested items.
    pub parent: Option<String>,
    /// Wire representation, opaque to the engine.
    pub data: serde_json::Value,
}

/// Wire representation of an item to write.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemotePayload {
    /// Remote identity, required for updates and deletes.
    pub id: Option<String>,
    /// Request body.
    pub body: serde_json::Value,
    /// Parent item the written item should be placed under.
    pub parent: Option<String>,
    /// Sibling the written item should be placed after.
    pub previous: Option<String>,
}

/// One page of a paginated query.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items of this page.
    pub items: Vec<T>,
    /// Continuation token for the next page.
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// A page without continuation.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }
}

/// Parameters of an item enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    /// Only items updated at or after this time.
    pub updated_min: Option<Timestamp>,
    /// Include tombstones.
    pub show_deleted: bool,
    /// Page size.
    pub max_results: u32,
    /// Continuation token from the previous page.
    pub page_token: Option<String>,
}

/// An item as held by the revision store.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedItem<P> {
    /// Unique id of the item.
    pub id: String,
    /// Revision marker derived from the payload.
    pub revision: Option<Revision>,
    /// Domain payload.
    pub payload: P,
}

/// The server's representation of an item right after it was written.
pub type AuthoritativeItem<P> = CachedItem<P>;

/// Result of one reconciliation pass.
///
/// The three lists are disjoint and contain each id at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet<P> {
    /// Items seen for the first time.
    pub created: Vec<CachedItem<P>>,
    /// Items whose revision changed.
    pub modified: Vec<CachedItem<P>>,
    /// Ids of removed items.
    pub removed: Vec<String>,
}

impl<P> Default for ChangeSet<P> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            modified: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<P> ChangeSet<P> {
    /// Whether the change set carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.created.len() + self.modified.len() + self.removed.len()
    }
}

/// Connection state of one engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No session.
    #[default]
    Disconnected,
    /// A connect attempt is in progress.
    Authorizing,
    /// A session is bound to the given list.
    Connected(ListId),
}

impl ConnectionState {
    /// The list the session is bound to, if connected.
    #[must_use]
    pub fn list(&self) -> Option<&ListId> {
        match self {
            Self::Connected(list) => Some(list),
            Self::Disconnected | Self::Authorizing => None,
        }
    }
}
