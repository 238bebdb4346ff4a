use mirage_core::{AssetId, AssetType};

use crate::error::NetError;

/// Capability the asset layer needs from the network stack.
///
/// Sends are fire-and-forget; responses arrive later as decoded
/// [`TransferEvent`](crate::TransferEvent)s delivered by the owning module.
/// The handle is borrowed per call and connectivity must be checked before
/// every send, since the connection can drop between ticks.
pub trait Transport {
    /// Whether a server connection is currently established.
    fn is_connected(&self) -> bool;

    /// Issue a download request for the given asset.
    fn send_download_request(
        &mut self,
        id: AssetId,
        asset_type: AssetType,
    ) -> Result<(), NetError>;
}
