// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Google Tasks backend for the tasksync engine.

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
// Allow certain clippy lints that are too restrictive for this crate
#![allow(clippy::module_name_repetitions, clippy::single_match_else)]

mod auth;
mod client;
mod config;
mod error;
mod http;
mod mapper;
mod types;

pub use crate::auth::{OAuthRefresh, StaticToken, credentials_from};
pub use crate::client::{GTasksBackend, GTasksClient};
pub use crate::config::{AuthMethod, GTasksConfig};
pub use crate::error::GTasksError;
pub use crate::mapper::{Task, TaskMapper};
pub use crate::types::{TaskList, TaskResource, TaskStatus};
