// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;

use crate::error::RemoteError;
use crate::types::{RemoteItem, RemotePayload, Revision};

/// Maps between remote wire data and the domain payload kept in the cache.
///
/// Implementations are pure and perform no I/O.
pub trait DomainMapper: Send + Sync {
    /// The domain object stored per item.
    type Payload: Clone + Debug + Send + Sync + 'static;

    /// Builds a payload from a remote snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidPayload`] if the remote data is unusable.
    fn from_remote(&self, item: &RemoteItem) -> Result<Self::Payload, RemoteError>;

    /// Builds the wire representation of a payload.
    ///
    /// `previous` is the cached version of the item, used to fill in fields the
    /// caller did not set. `include_id` is false for creations, where the server
    /// assigns the id.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidPayload`] if the payload cannot be written.
    fn to_remote(
        &self,
        payload: &Self::Payload,
        previous: Option<&Self::Payload>,
        include_id: bool,
    ) -> Result<RemotePayload, RemoteError>;

    /// The unique id of a payload, if it has one.
    fn uid(&self, payload: &Self::Payload) -> Option<String>;

    /// The revision marker of a payload.
    fn revision(&self, payload: &Self::Payload) -> Option<Revision>;

    /// Copies fields the remote store does not track from the cached payload
    /// into a fresh one.
    fn carry_forward(&self, fresh: &mut Self::Payload, cached: &Self::Payload);
}
