//! Transfer events delivered to the owning asset service

use mirage_core::{AssetId, RequestTag};

/// Notification emitted by the transfer engine.
///
/// Completion, cancellation, and failure are emitted once per requester tag,
/// so N logical callers waiting on one transfer each get their own event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEvent {
    /// New bytes arrived for an in-flight transfer.
    Progress {
        id: AssetId,
        received: u32,
        received_continuous: u32,
        size: u32,
    },
    /// The asset assembled fully and was handed to the store.
    Completed { tag: RequestTag, id: AssetId },
    /// The server cancelled the transfer; it will not be retried.
    Canceled { tag: RequestTag, id: AssetId },
    /// The transfer exhausted its retry budget.
    Failed { tag: RequestTag, id: AssetId },
}

/// Receiver for transfer events.
pub trait EventSink {
    fn emit(&mut self, event: AssetEvent);
}
