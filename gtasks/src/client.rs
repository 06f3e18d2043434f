// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Tasks API client.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use reqwest::Method;
use tasksync_core::{
    AccessToken, ItemQuery, ListId, ListSummary, Page, RemoteError, RemoteItem, RemoteListClient,
    RemotePayload, SessionFactory, cancellable,
};
use tokio_util::sync::CancellationToken;

use crate::config::GTasksConfig;
use crate::error::GTasksError;
use crate::http::HttpClient;
use crate::types::{TaskLists, TaskResource, Tasks};

const LISTS_PAGE_SIZE: u32 = 100;

/// Client of the Tasks API, bound to one access token.
///
/// # Example
///
/// ```ignore
/// use tasksync_core::{AccessToken, ListId, RemoteListClient};
/// use tasksync_gtasks::{GTasksClient, GTasksConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GTasksClient::new(&GTasksConfig::default(), AccessToken::from("ya29..."))?;
/// let lists = client.query_lists(&Default::default()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GTasksClient {
    http: Arc<HttpClient>,
}

impl GTasksClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(config: &GTasksConfig, token: AccessToken) -> Result<Self, GTasksError> {
        let http = HttpClient::new(config, token)?;
        Ok(Self {
            http: Arc::new(http),
        })
    }

    async fn lists_page(&self, page_token: Option<&str>) -> Result<TaskLists, GTasksError> {
        let url = self.http.url(&["users", "@me", "lists"]);
        let mut req = self
            .http
            .build_request(Method::GET, url)
            .query(&[("maxResults", LISTS_PAGE_SIZE.to_string())]);
        if let Some(token) = page_token {
            req = req.query(&[("pageToken", token)]);
        }

        let resp = self.http.execute(req).await?;
        HttpClient::json(resp).await
    }

    async fn list(&self, list: &ListId) -> Result<ListSummary, GTasksError> {
        let url = self.http.url(&["users", "@me", "lists", list.as_str()]);
        let resp = self
            .http
            .execute(self.http.build_request(Method::GET, url))
            .await?;
        let list: crate::types::TaskList = HttpClient::json(resp).await?;
        Ok(list.into())
    }

    async fn tasks_page(&self, list: &ListId, query: &ItemQuery) -> Result<Tasks, GTasksError> {
        let url = self.http.url(&["lists", list.as_str(), "tasks"]);
        let mut params = vec![
            ("maxResults", query.max_results.to_string()),
            ("showCompleted", "true".to_string()),
            ("showHidden", "true".to_string()),
        ];
        if query.show_deleted {
            params.push(("showDeleted", "true".to_string()));
        }
        if let Some(updated_min) = query.updated_min {
            params.push(("updatedMin", format_timestamp(updated_min)));
        }
        if let Some(token) = &query.page_token {
            params.push(("pageToken", token.clone()));
        }

        let req = self.http.build_request(Method::GET, url).query(&params);
        let resp = self.http.execute(req).await?;
        HttpClient::json(resp).await
    }

    async fn insert(
        &self,
        list: &ListId,
        payload: &RemotePayload,
    ) -> Result<TaskResource, GTasksError> {
        let url = self.http.url(&["lists", list.as_str(), "tasks"]);
        let mut req = self
            .http
            .build_request(Method::POST, url)
            .json(&payload.body);
        if let Some(parent) = &payload.parent {
            req = req.query(&[("parent", parent)]);
        }
        if let Some(previous) = &payload.previous {
            req = req.query(&[("previous", previous)]);
        }

        let resp = self.http.execute(req).await?;
        HttpClient::json(resp).await
    }

    async fn update(
        &self,
        list: &ListId,
        id: &str,
        payload: &RemotePayload,
    ) -> Result<TaskResource, GTasksError> {
        let url = self.http.url(&["lists", list.as_str(), "tasks", id]);
        let req = self
            .http
            .build_request(Method::PATCH, url)
            .json(&payload.body);
        let resp = self.http.execute(req).await?;
        HttpClient::json(resp).await
    }

    async fn move_to(
        &self,
        list: &ListId,
        id: &str,
        parent: Option<&str>,
    ) -> Result<TaskResource, GTasksError> {
        let url = self.http.url(&["lists", list.as_str(), "tasks", id, "move"]);
        let mut req = self.http.build_request(Method::POST, url);
        if let Some(parent) = parent {
            req = req.query(&[("parent", parent)]);
        }
        let resp = self.http.execute(req).await?;
        HttpClient::json(resp).await
    }

    async fn delete(&self, list: &ListId, id: &str) -> Result<(), GTasksError> {
        let url = self.http.url(&["lists", list.as_str(), "tasks", id]);
        self.http
            .execute(self.http.build_request(Method::DELETE, url))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteListClient for GTasksClient {
    async fn query_lists(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ListSummary>, RemoteError> {
        let mut lists = Vec::new();
        let mut page_token = None;
        loop {
            let page = cancellable(cancel, async {
                Ok::<_, RemoteError>(self.lists_page(page_token.as_deref()).await?)
            })
            .await?;
            lists.extend(page.items.into_iter().map(ListSummary::from));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        tracing::debug!(count = lists.len(), "fetched task lists");
        Ok(lists)
    }

    async fn get_list(
        &self,
        list: &ListId,
        cancel: &CancellationToken,
    ) -> Result<ListSummary, RemoteError> {
        cancellable(cancel, async {
            Ok::<_, RemoteError>(self.list(list).await?)
        })
        .await
    }

    async fn query_items(
        &self,
        list: &ListId,
        query: &ItemQuery,
        cancel: &CancellationToken,
    ) -> Result<Page<RemoteItem>, RemoteError> {
        let page = cancellable(cancel, async {
            match self.tasks_page(list, query).await {
                Ok(page) => Ok(page),
                // older servers reject the time window outright
                Err(e) if e.status() == Some(400) && query.updated_min.is_some() => {
                    Err(RemoteError::MalformedQueryParameter(e.to_string()))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await?;

        let items = page
            .items
            .into_iter()
            .map(TaskResource::into_remote_item)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            next_page_token: page.next_page_token.filter(|a| !a.is_empty()),
        })
    }

    async fn insert_item(
        &self,
        list: &ListId,
        payload: &RemotePayload,
        cancel: &CancellationToken,
    ) -> Result<RemoteItem, RemoteError> {
        let task = cancellable(cancel, async {
            Ok::<_, RemoteError>(self.insert(list, payload).await?)
        })
        .await?;
        Ok(task.into_remote_item()?)
    }

    async fn update_item(
        &self,
        list: &ListId,
        payload: &RemotePayload,
        cancel: &CancellationToken,
    ) -> Result<RemoteItem, RemoteError> {
        let id = remote_id(payload)?;
        let task = cancellable(cancel, async {
            Ok::<_, RemoteError>(self.update(list, id, payload).await?)
        })
        .await?;
        Ok(task.into_remote_item()?)
    }

    async fn move_item(
        &self,
        list: &ListId,
        id: &str,
        parent: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<RemoteItem, RemoteError> {
        let task = cancellable(cancel, async {
            Ok::<_, RemoteError>(self.move_to(list, id, parent).await?)
        })
        .await?;
        Ok(task.into_remote_item()?)
    }

    async fn delete_item(
        &self,
        list: &ListId,
        payload: &RemotePayload,
        cancel: &CancellationToken,
    ) -> Result<(), RemoteError> {
        let id = remote_id(payload)?;
        cancellable(cancel, async {
            match self.delete(list, id).await {
                Ok(()) => Ok(()),
                // a successful delete answers without a body
                Err(GTasksError::Status { status, message })
                    if (200..300).contains(&status) && message.trim().is_empty() =>
                {
                    Err(RemoteError::ProtocolQuirkSuccess(format!(
                        "delete answered {status} without a body"
                    )))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }
}

fn remote_id(payload: &RemotePayload) -> Result<&str, RemoteError> {
    payload
        .id
        .as_deref()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| RemoteError::InvalidPayload("task has no remote id".to_string()))
}

/// RFC 3339 with millisecond precision, as the API emits it.
fn format_timestamp(ts: Timestamp) -> String {
    ts.strftime("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Opens [`GTasksClient`] sessions.
#[derive(Debug, Clone, Default)]
pub struct GTasksBackend {
    config: GTasksConfig,
}

impl GTasksBackend {
    /// Creates a backend for the given server.
    #[must_use]
    pub const fn new(config: GTasksConfig) -> Self {
        Self { config }
    }

    /// The server configuration.
    #[must_use]
    pub const fn config(&self) -> &GTasksConfig {
        &self.config
    }
}

impl SessionFactory for GTasksBackend {
    type Client = GTasksClient;

    fn open_session(&self, token: AccessToken) -> Result<GTasksClient, RemoteError> {
        Ok(GTasksClient::new(&self.config, token)?)
    }
}
