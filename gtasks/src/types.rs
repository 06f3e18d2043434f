// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Wire types of the Tasks API.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tasksync_core::{ListId, ListSummary, RemoteItem};

use crate::error::GTasksError;

/// Completion status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Not done yet.
    #[default]
    NeedsAction,
    /// Done.
    Completed,
}

/// A task list resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    /// List identifier.
    pub id: String,
    /// Title of the list.
    #[serde(default)]
    pub title: Option<String>,
    /// Last modification time of the list or any of its tasks.
    #[serde(default)]
    pub updated: Option<Timestamp>,
    /// URL of this resource.
    #[serde(default)]
    pub self_link: Option<String>,
}

impl From<TaskList> for ListSummary {
    fn from(list: TaskList) -> Self {
        Self {
            id: ListId::new(list.id),
            title: list.title,
            updated: list.updated,
        }
    }
}

/// One page of task lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLists {
    /// The lists of this page.
    #[serde(default)]
    pub items: Vec<TaskList>,
    /// Token of the next page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A task resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResource {
    /// Task identifier.
    #[serde(default)]
    pub id: String,
    /// `ETag` of the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Title of the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
    /// URL of this resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Parent task identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Sort key among siblings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Notes describing the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Status of the task.
    #[serde(default)]
    pub status: TaskStatus,
    /// Due date; only the date part is meaningful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<Timestamp>,
    /// Completion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<Timestamp>,
    /// Whether the task has been deleted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    /// Whether the task has been hidden.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl TaskResource {
    /// Converts the resource into the engine's item snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be re-encoded.
    pub fn into_remote_item(self) -> Result<RemoteItem, GTasksError> {
        Ok(RemoteItem {
            data: serde_json::to_value(&self)?,
            id: self.id,
            updated: self.updated,
            deleted: self.deleted,
            parent: self.parent,
        })
    }
}

/// One page of tasks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tasks {
    /// The tasks of this page.
    #[serde(default)]
    pub items: Vec<TaskResource>,
    /// Token of the next page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}
