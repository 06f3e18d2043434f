// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::types::ListId;

/// Whether the session must be re-established because the configured list no
/// longer matches the list the session is bound to.
///
/// A session bound to the [`ListId::DEFAULT`] sentinel is never forced to
/// reconnect, nor is a missing or empty configured list.
#[must_use]
pub fn requires_reconnect(bound: Option<&ListId>, configured: Option<&ListId>) -> bool {
    match (bound, configured) {
        (Some(bound), Some(configured)) => {
            !configured.is_empty() && configured != bound && !bound.is_default()
        }
        _ => false,
    }
}
