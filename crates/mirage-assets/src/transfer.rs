//! Per-asset transfer record
//!
//! One [`AssetTransfer`] tracks a single in-flight download: its declared
//! size, the byte ranges received so far, the reassembly buffer, and the
//! request tags waiting on it. Records live in a [`TransferTable`] from the
//! first request until completion, cancellation, or terminal timeout.
//!
//! [`TransferTable`]: crate::TransferTable

use mirage_core::{AssetId, AssetType, RequestTag};

use crate::ranges::RangeSet;

/// Result of feeding one data chunk into a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Payload copied; transfer still incomplete.
    Accepted,
    /// Payload copied and the whole asset is now assembled.
    Complete,
    /// Chunk range already received; nothing changed.
    Duplicate,
    /// No header has arrived yet, so the byte offset is unknown.
    NoHeader,
    /// Chunk falls outside the declared asset size.
    OutOfBounds,
}

/// State of one in-flight asset download.
#[derive(Debug)]
pub struct AssetTransfer {
    id: AssetId,
    asset_type: AssetType,
    expected_size: Option<u32>,
    chunk_size: Option<u32>,
    ranges: RangeSet,
    buffer: Vec<u8>,
    tags: Vec<RequestTag>,
    age: f64,
    retries: u32,
    seq: u64,
}

impl AssetTransfer {
    /// Create a record for a freshly requested asset.
    ///
    /// `seq` is a monotonic request ordinal used to preserve original
    /// request order across connection loss. `retries` carries the timeout
    /// retry count across re-queues.
    pub fn new(
        id: AssetId,
        asset_type: AssetType,
        tags: Vec<RequestTag>,
        retries: u32,
        seq: u64,
    ) -> Self {
        Self {
            id,
            asset_type,
            expected_size: None,
            chunk_size: None,
            ranges: RangeSet::new(),
            buffer: Vec::new(),
            tags,
            age: 0.0,
            retries,
            seq,
        }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// Declared total size, or 0 while the header is outstanding.
    pub fn size(&self) -> u32 {
        self.expected_size.unwrap_or(0)
    }

    /// Total bytes received so far, in any order.
    pub fn received(&self) -> u32 {
        self.ranges.total()
    }

    /// Length of the gap-free byte prefix received from offset 0.
    pub fn received_continuous(&self) -> u32 {
        self.ranges.continuous()
    }

    /// Number of chunks the full asset spans, once the header has arrived.
    pub fn total_chunks(&self) -> Option<u32> {
        match (self.expected_size, self.chunk_size) {
            (Some(size), Some(chunk)) if chunk > 0 => Some(size.div_ceil(chunk)),
            _ => None,
        }
    }

    /// Apply a transfer header, sizing the buffer.
    ///
    /// Idempotent: a replayed header leaves already-received data intact.
    pub fn apply_header(&mut self, size: u32, chunk_size: u32) {
        self.expected_size = Some(size);
        self.chunk_size = Some(chunk_size);
        if self.buffer.len() < size as usize {
            self.buffer.resize(size as usize, 0);
        }
        self.age = 0.0;
    }

    /// Copy one chunk payload into the buffer at `index * chunk_size`.
    ///
    /// A chunk that is a duplicate, precedes the header, or overruns the
    /// declared size leaves the record untouched. Accepting new bytes resets
    /// the timeout clock.
    pub fn apply_chunk(&mut self, index: u32, payload: &[u8]) -> ChunkOutcome {
        let (size, chunk_size) = match (self.expected_size, self.chunk_size) {
            (Some(size), Some(chunk_size)) if chunk_size > 0 => (size, chunk_size),
            _ => return ChunkOutcome::NoHeader,
        };

        let start = index as u64 * chunk_size as u64;
        let end = start + payload.len() as u64;
        if end > size as u64 {
            return ChunkOutcome::OutOfBounds;
        }
        let (start, end) = (start as u32, end as u32);

        if !self.ranges.insert(start, end) {
            return ChunkOutcome::Duplicate;
        }

        self.buffer[start as usize..end as usize].copy_from_slice(payload);
        self.age = 0.0;

        if self.ranges.continuous() == size {
            ChunkOutcome::Complete
        } else {
            ChunkOutcome::Accepted
        }
    }

    /// Request tags waiting on this transfer.
    pub fn tags(&self) -> &[RequestTag] {
        &self.tags
    }

    /// Add a requester tag; duplicates are ignored.
    pub fn add_tag(&mut self, tag: RequestTag) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Consume the record, yielding the assembled buffer and its tags.
    pub fn into_parts(self) -> (Vec<u8>, Vec<RequestTag>) {
        (self.buffer, self.tags)
    }

    /// Copy of the first `received_continuous` bytes.
    pub fn continuous_data(&self) -> Vec<u8> {
        self.buffer[..self.received_continuous() as usize].to_vec()
    }

    /// Seconds since the last received chunk, or since the request was sent.
    pub fn age(&self) -> f64 {
        self.age
    }

    /// Advance the timeout clock.
    pub fn tick(&mut self, delta_time: f64) {
        self.age += delta_time;
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}
