// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.

use jiff::Timestamp;
use serde_json::json;
use tasksync_core::{
    CachedItem, DomainMapper, RemoteError, RemoteItem, RemotePayload, Revision, SyncConfig,
};

/// A minimal task-like payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Note {
    pub id: Option<String>,
    pub title: String,
    pub updated: Option<Timestamp>,
    /// First time the note was seen, never sent to the server.
    pub created: Option<Timestamp>,
    pub parent: Option<String>,
}

impl Note {
    pub fn draft(title: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            updated: None,
            created: None,
            parent: None,
        }
    }
}

/// Maps [`Note`] to and from the JSON the fake remote speaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteMapper;

impl DomainMapper for NoteMapper {
    type Payload = Note;

    fn from_remote(&self, item: &RemoteItem) -> Result<Note, RemoteError> {
        let title = item.data["title"]
            .as_str()
            .ok_or_else(|| RemoteError::InvalidPayload(format!("{} has no title", item.id)))?;
        Ok(Note {
            id: Some(item.id.clone()),
            title: title.to_string(),
            updated: item.updated,
            created: item.updated,
            parent: item.parent.clone(),
        })
    }

    fn to_remote(
        &self,
        payload: &Note,
        previous: Option<&Note>,
        include_id: bool,
    ) -> Result<RemotePayload, RemoteError> {
        let parent = payload
            .parent
            .clone()
            .or_else(|| previous.and_then(|a| a.parent.clone()));
        Ok(RemotePayload {
            id: if include_id { payload.id.clone() } else { None },
            body: json!({ "title": payload.title }),
            parent,
            previous: None,
        })
    }

    fn uid(&self, payload: &Note) -> Option<String> {
        payload.id.clone()
    }

    fn revision(&self, payload: &Note) -> Option<Revision> {
        payload.updated.map(|a| Revision::new(a.to_string()))
    }

    fn carry_forward(&self, fresh: &mut Note, cached: &Note) {
        fresh.created = cached.created;
    }
}

/// A timestamp `secs` seconds after a fixed base.
pub fn ts(secs: i64) -> Timestamp {
    Timestamp::from_second(1_717_200_000 + secs).unwrap()
}

/// A configuration bound to `list_id`.
pub fn test_config(list_id: Option<&str>) -> SyncConfig {
    SyncConfig {
        list_id: list_id.map(str::to_string),
        page_size: 100,
        state_dir: None,
    }
}

/// A cached note as the store would hold it.
pub fn cached_note(id: &str, title: &str, updated: Timestamp, created: Timestamp) -> CachedItem<Note> {
    CachedItem {
        id: id.to_string(),
        revision: Some(Revision::new(updated.to_string())),
        payload: Note {
            id: Some(id.to_string()),
            title: title.to_string(),
            updated: Some(updated),
            created: Some(created),
            parent: None,
        },
    }
}
