//! FIFO queue of requests waiting for a connection
//!
//! Requests made while disconnected, timeout retries, and transfers rescued
//! from a dropped connection all land here, then drain in order once the
//! transport reports connected again.

use std::collections::VecDeque;

use mirage_core::{AssetId, AssetType, RequestTag};

/// A download request buffered until a connection is available.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: AssetId,
    pub asset_type: AssetType,
    pub tags: Vec<RequestTag>,
    /// Timeout retries already consumed by this request.
    pub retries: u32,
}

/// FIFO list of pending requests, deduplicated by asset ID.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: VecDeque<PendingRequest>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request, merging tags into an existing entry for the same
    /// asset instead of queueing it twice.
    pub fn push(&mut self, request: PendingRequest) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == request.id) {
            for tag in request.tags {
                if !existing.tags.contains(&tag) {
                    existing.tags.push(tag);
                }
            }
            existing.retries = existing.retries.max(request.retries);
            return;
        }
        self.entries.push_back(request);
    }

    /// Attach another requester tag to an already-queued asset.
    ///
    /// Returns `false` if the asset is not queued.
    pub fn add_tag(&mut self, id: AssetId, tag: RequestTag) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                if !entry.tags.contains(&tag) {
                    entry.tags.push(tag);
                }
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Remove and return every entry in FIFO order.
    pub fn take_all(&mut self) -> VecDeque<PendingRequest> {
        std::mem::take(&mut self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
