//! Mirage Assets - UDP asset transfer engine
//!
//! Fetches binary assets (textures and generic files) over a lossy
//! header-plus-chunks protocol and exposes them as incrementally-completable
//! byte buffers. The engine reassembles out-of-order, possibly duplicated
//! chunks, deduplicates concurrent requests for the same asset, and retries
//! stalled transfers from its per-frame [`UdpAssetProvider::update`] tick.

mod config;
mod events;
mod pending;
mod provider;
mod ranges;
mod store;
mod table;
mod transfer;

pub use config::TransferConfig;
pub use events::{AssetEvent, EventSink};
pub use pending::{PendingQueue, PendingRequest};
pub use provider::{AssetStatus, UdpAssetProvider};
pub use ranges::RangeSet;
pub use store::AssetStore;
pub use table::{ClassPolicy, TransferTable};
pub use transfer::{AssetTransfer, ChunkOutcome};
