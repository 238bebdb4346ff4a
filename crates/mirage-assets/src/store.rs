use mirage_core::{AssetId, AssetType};

/// Destination for completed assets.
///
/// Called exactly once per completed transfer. Storage failures are the
/// store's concern; the engine treats the handoff as infallible.
pub trait AssetStore {
    fn store(&mut self, id: AssetId, asset_type: AssetType, data: Vec<u8>);
}
