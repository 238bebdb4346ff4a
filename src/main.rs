//! Mirage - headless asset transfer demo
//!
//! Drives the UDP asset transfer engine against a simulated lossy server:
//! requests a batch of assets, feeds shuffled/duplicated/dropped chunks
//! through the provider, survives a mid-session disconnect, and verifies the
//! reassembled bytes at the end.

mod settings;
mod sim;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use anyhow::{ensure, Result};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use mirage_assets::{AssetEvent, AssetStore, EventSink, UdpAssetProvider};
use mirage_core::{AssetId, AssetType, RequestTag};

use crate::settings::ClientSettings;
use crate::sim::SimTransport;

/// Everything observed during one demo session.
#[derive(Default)]
struct Session {
    cache: HashMap<AssetId, Vec<u8>>,
    failed: HashSet<AssetId>,
}

impl Session {
    /// Assets that reached a terminal state.
    fn settled(&self) -> usize {
        self.cache.len() + self.failed.len()
    }
}

struct CacheStore(Rc<RefCell<Session>>);

impl AssetStore for CacheStore {
    fn store(&mut self, id: AssetId, asset_type: AssetType, data: Vec<u8>) {
        info!("Stored {} {} ({} bytes)", asset_type, id, data.len());
        self.0.borrow_mut().cache.insert(id, data);
    }
}

struct SessionSink(Rc<RefCell<Session>>);

impl EventSink for SessionSink {
    fn emit(&mut self, event: AssetEvent) {
        match event {
            AssetEvent::Progress {
                id,
                received,
                received_continuous,
                size,
            } => debug!(
                "Progress {}: {}/{} bytes ({} continuous)",
                id, received, size, received_continuous
            ),
            AssetEvent::Completed { tag, id } => info!("Completed {} for tag {}", id, tag),
            AssetEvent::Canceled { tag, id } => warn!("Canceled {} for tag {}", id, tag),
            AssetEvent::Failed { tag, id } => {
                warn!("Failed {} for tag {}", id, tag);
                self.0.borrow_mut().failed.insert(id);
            }
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    info!("Starting Mirage asset transfer demo...");

    let settings = ClientSettings::load();
    if let Err(e) = settings.save() {
        warn!("Could not persist settings: {}", e);
    }

    let session = Rc::new(RefCell::new(Session::default()));
    let mut provider = UdpAssetProvider::new(
        settings.transfer.clone(),
        Box::new(CacheStore(session.clone())),
        Box::new(SessionSink(session.clone())),
    );
    let mut transport = SimTransport::new(&settings.simulation);
    info!("Provider: {}", provider.name());

    // Request a mixed batch of textures and meshes.
    let mut next_tag: RequestTag = 1;
    let mut requested = Vec::new();
    for i in 0..settings.simulation.asset_count {
        let id = AssetId::new();
        let asset_type = if i % 2 == 0 {
            AssetType::Texture
        } else {
            AssetType::Mesh
        };
        ensure!(
            provider.request_asset(&id.to_string(), asset_type, next_tag, &mut transport),
            "request for {} was rejected",
            id
        );
        next_tag += 1;
        requested.push(id);
    }

    // A second consumer waiting on the first texture: one wire transfer,
    // two completion events.
    provider.request_asset(
        &requested[0].to_string(),
        AssetType::Texture,
        next_tag,
        &mut transport,
    );

    let max_ticks = 20_000;
    for tick in 0..max_ticks {
        if tick == 40 {
            info!("Simulating connection loss");
            transport.set_connected(false);
        }
        if tick == 46 {
            info!("Simulating reconnect");
            transport.set_connected(true);
        }

        // Pump a bounded number of inbound messages, then tick the engine.
        for _ in 0..32 {
            match transport.next_event() {
                Some(event) => provider.handle_event(event),
                None => break,
            }
        }
        provider.update(settings.simulation.tick_seconds, &mut transport);

        if session.borrow().settled() >= settings.simulation.asset_count {
            break;
        }
    }

    let session = session.borrow();
    for id in &requested {
        if let Some(data) = session.cache.get(id) {
            let expected = transport.content(*id).unwrap_or_default();
            ensure!(
                data.as_slice() == expected,
                "stored bytes for {} differ from server content",
                id
            );
        }
    }
    info!(
        "Session finished: {} assets stored, {} failed",
        session.cache.len(),
        session.failed.len()
    );

    Ok(())
}
