//! Decoded inbound transfer messages
//!
//! The server speaks a header-plus-chunks protocol: one header announces the
//! total size and chunk size of an asset, then data messages carry one chunk
//! each, identified by index. Textures and generic assets use distinct wire
//! messages, so each appears as its own variant here.

use serde::{Deserialize, Serialize};

use mirage_core::AssetId;

/// Transfer header announcing the dimensions of an incoming asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferHeader {
    pub id: AssetId,
    /// Total asset size in bytes.
    pub size: u32,
    /// Size of every chunk except possibly the last.
    pub chunk_size: u32,
}

/// One chunk of asset content.
///
/// The byte offset of the payload is `index * chunk_size` as declared by the
/// matching header. Chunks may arrive in any order, duplicated, or not at
/// all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferChunk {
    pub id: AssetId,
    pub index: u32,
    pub payload: Vec<u8>,
}

/// A decoded inbound transfer message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferEvent {
    TextureHeader(TransferHeader),
    TextureData(TransferChunk),
    TextureCancel { id: AssetId },
    AssetHeader(TransferHeader),
    AssetData(TransferChunk),
    AssetCancel { id: AssetId },
}

impl TransferEvent {
    /// The asset this message concerns.
    pub fn asset_id(&self) -> AssetId {
        match self {
            TransferEvent::TextureHeader(h) | TransferEvent::AssetHeader(h) => h.id,
            TransferEvent::TextureData(c) | TransferEvent::AssetData(c) => c.id,
            TransferEvent::TextureCancel { id } | TransferEvent::AssetCancel { id } => *id,
        }
    }

    /// Whether this message belongs to the texture transfer path.
    pub fn is_texture(&self) -> bool {
        matches!(
            self,
            TransferEvent::TextureHeader(_)
                | TransferEvent::TextureData(_)
                | TransferEvent::TextureCancel { .. }
        )
    }
}
