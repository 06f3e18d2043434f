// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Mapping between Tasks API resources and cached tasks.

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tasksync_core::{DomainMapper, RemoteError, RemoteItem, RemotePayload, Revision};

use crate::types::{TaskResource, TaskStatus};

/// A task as kept in the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Remote identity, unset until the task is first saved.
    pub uid: Option<String>,
    /// Title of the task.
    pub summary: String,
    /// Free-form notes.
    pub description: Option<String>,
    /// Completion status.
    pub status: TaskStatus,
    /// Due date.
    pub due: Option<Date>,
    /// Completion time.
    pub completed: Option<Timestamp>,
    /// First time the task was seen.
    pub created: Option<Timestamp>,
    /// Last modification time reported by the server.
    pub last_modified: Option<Timestamp>,
    /// Parent task, for subtasks.
    pub parent: Option<String>,
    /// Sort key among siblings.
    pub position: Option<String>,
    /// URL of the remote resource.
    pub self_link: Option<String>,
}

impl Task {
    /// A new, not yet saved task.
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            uid: None,
            summary: summary.into(),
            description: None,
            status: TaskStatus::NeedsAction,
            due: None,
            completed: None,
            created: None,
            last_modified: None,
            parent: None,
            position: None,
            self_link: None,
        }
    }

    /// Whether the task is done.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Maps [`TaskResource`]s to [`Task`]s and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskMapper;

impl DomainMapper for TaskMapper {
    type Payload = Task;

    fn from_remote(&self, item: &RemoteItem) -> Result<Task, RemoteError> {
        let resource: TaskResource = serde_json::from_value(item.data.clone())
            .map_err(|e| RemoteError::InvalidPayload(format!("task {}: {e}", item.id)))?;

        let updated = item
            .updated
            .or(resource.updated)
            .unwrap_or_else(Timestamp::now);
        Ok(Task {
            uid: Some(item.id.clone()),
            summary: resource.title.unwrap_or_default(),
            description: resource.notes.filter(|a| !a.is_empty()),
            status: resource.status,
            due: resource.due.map(|a| a.to_zoned(TimeZone::UTC).date()),
            completed: resource.completed,
            created: Some(updated),
            last_modified: Some(updated),
            parent: item.parent.clone().or(resource.parent),
            position: resource.position,
            self_link: resource.self_link,
        })
    }

    fn to_remote(
        &self,
        payload: &Task,
        previous: Option<&Task>,
        include_id: bool,
    ) -> Result<RemotePayload, RemoteError> {
        let id = if include_id {
            let id = payload
                .uid
                .clone()
                .or_else(|| previous.and_then(|a| a.uid.clone()))
                .filter(|a| !a.is_empty())
                .ok_or_else(|| RemoteError::InvalidPayload("task has no uid".to_string()))?;
            Some(id)
        } else {
            None
        };

        // a completion time implies the status, and the server wants both
        let (status, completed) = match (payload.status, payload.completed) {
            (_, Some(at)) => (TaskStatus::Completed, Some(at)),
            (TaskStatus::Completed, None) => (TaskStatus::Completed, Some(Timestamp::now())),
            (TaskStatus::NeedsAction, None) => (TaskStatus::NeedsAction, None),
        };

        // cleared fields are sent as explicit nulls so a patch removes them
        let mut body = json!({
            "title": payload.summary,
            "notes": payload.description,
            "status": status,
            "due": payload.due.map(|a| format!("{a}T00:00:00.000Z")),
            "completed": completed.map(|a| a.to_string()),
        });
        let position = payload
            .position
            .clone()
            .or_else(|| previous.and_then(|a| a.position.clone()));
        if let Some(obj) = body.as_object_mut() {
            if let Some(id) = &id {
                obj.insert("id".to_string(), json!(id));
            }
            if let Some(position) = position {
                obj.insert("position".to_string(), json!(position));
            }
        }

        let parent = payload
            .parent
            .clone()
            .or_else(|| previous.and_then(|a| a.parent.clone()));
        Ok(RemotePayload {
            id,
            body,
            parent,
            previous: None,
        })
    }

    fn uid(&self, payload: &Task) -> Option<String> {
        payload.uid.clone()
    }

    fn revision(&self, payload: &Task) -> Option<Revision> {
        payload.last_modified.map(|a| Revision::new(a.to_string()))
    }

    fn carry_forward(&self, fresh: &mut Task, cached: &Task) {
        if cached.created.is_some() {
            fresh.created = cached.created;
        }
    }
}
