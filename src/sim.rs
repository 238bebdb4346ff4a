//! Simulated lossy asset server
//!
//! Stands in for a real network connection so the demo session can exercise
//! the transfer engine end to end: chunks arrive shuffled, some are dropped,
//! some are duplicated, and the connection can be cut mid-transfer.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use mirage_core::{AssetId, AssetType};
use mirage_net::{NetError, TransferChunk, TransferEvent, TransferHeader, Transport};

use crate::settings::SimSettings;

/// In-memory transport that answers download requests with randomized
/// header-plus-chunks deliveries.
pub struct SimTransport {
    connected: bool,
    rng: StdRng,
    loss: f64,
    duplicate: f64,
    chunk_size: u32,
    /// Messages in flight toward the client.
    inbox: VecDeque<TransferEvent>,
    /// Content per asset, generated on first request so retries resend the
    /// same bytes.
    catalog: HashMap<AssetId, Vec<u8>>,
}

impl SimTransport {
    pub fn new(settings: &SimSettings) -> Self {
        Self {
            connected: true,
            rng: StdRng::seed_from_u64(settings.seed),
            loss: settings.loss,
            duplicate: settings.duplicate,
            chunk_size: settings.chunk_size.max(1),
            inbox: VecDeque::new(),
            catalog: HashMap::new(),
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        if !connected {
            // A dropped link loses whatever was in flight.
            self.inbox.clear();
        }
    }

    /// Next inbound message, if any.
    pub fn next_event(&mut self) -> Option<TransferEvent> {
        if self.connected {
            self.inbox.pop_front()
        } else {
            None
        }
    }

    /// Expected byte content of an asset, for end-of-run verification.
    pub fn content(&self, id: AssetId) -> Option<&[u8]> {
        self.catalog.get(&id).map(|v| v.as_slice())
    }

    fn asset_content(&mut self, id: AssetId) -> Vec<u8> {
        let rng = &mut self.rng;
        self.catalog
            .entry(id)
            .or_insert_with(|| {
                let len = rng.gen_range(2_000..16_000);
                (0..len).map(|_| rng.gen()).collect()
            })
            .clone()
    }
}

impl Transport for SimTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send_download_request(&mut self, id: AssetId, asset_type: AssetType) -> Result<(), NetError> {
        if !self.connected {
            return Err(NetError::NotConnected);
        }

        let data = self.asset_content(id);
        let size = data.len() as u32;
        let chunk_size = self.chunk_size;
        let texture = asset_type.is_texture();

        let header = TransferHeader {
            id,
            size,
            chunk_size,
        };
        self.inbox.push_back(if texture {
            TransferEvent::TextureHeader(header)
        } else {
            TransferEvent::AssetHeader(header)
        });

        let mut indices: Vec<u32> = (0..size.div_ceil(chunk_size)).collect();
        indices.shuffle(&mut self.rng);

        for index in indices {
            if self.rng.gen_bool(self.loss) {
                debug!("Simulated loss of chunk {} for {}", index, id);
                continue;
            }
            let start = (index * chunk_size) as usize;
            let end = (start + chunk_size as usize).min(data.len());
            let chunk = TransferChunk {
                id,
                index,
                payload: data[start..end].to_vec(),
            };
            let copies = if self.rng.gen_bool(self.duplicate) { 2 } else { 1 };
            for _ in 0..copies {
                self.inbox.push_back(if texture {
                    TransferEvent::TextureData(chunk.clone())
                } else {
                    TransferEvent::AssetData(chunk.clone())
                });
            }
        }

        Ok(())
    }
}
