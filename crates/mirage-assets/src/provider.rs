//! UDP asset provider facade
//!
//! The public contract consumed by the asset service: request assets, query
//! progress, read partial data, and drive the per-frame tick. Internally it
//! owns the two transfer tables (textures and generic assets), the pending
//! request queue, and the chunk ingestion state machine.
//!
//! Single-threaded by construction: `update` and `handle_event` run on the
//! owning module's tick thread, so no transfer is ever touched by two call
//! paths at once. The transport handle is borrowed per call and its
//! connectivity checked before every send.

use tracing::{debug, info, warn};

use mirage_core::{AssetId, AssetType, RequestTag};
use mirage_net::{TransferChunk, TransferEvent, TransferHeader, Transport};

use crate::config::TransferConfig;
use crate::events::{AssetEvent, EventSink};
use crate::pending::{PendingQueue, PendingRequest};
use crate::store::AssetStore;
use crate::table::{ClassPolicy, TransferTable};
use crate::transfer::{AssetTransfer, ChunkOutcome};

/// Snapshot of one transfer's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetStatus {
    /// Declared total size, 0 while the header is outstanding.
    pub size: u32,
    /// Bytes received so far, in any order.
    pub received: u32,
    /// Gap-free bytes received from offset 0.
    pub received_continuous: u32,
}

/// Asset provider speaking the legacy UDP header-plus-chunks protocol.
pub struct UdpAssetProvider {
    config: TransferConfig,
    textures: TransferTable,
    assets: TransferTable,
    pending: PendingQueue,
    store: Box<dyn AssetStore>,
    events: Box<dyn EventSink>,
    /// Monotonic ordinal stamped onto each activated transfer so request
    /// order survives connection loss and re-queueing.
    next_seq: u64,
}

impl UdpAssetProvider {
    pub fn new(
        config: TransferConfig,
        store: Box<dyn AssetStore>,
        events: Box<dyn EventSink>,
    ) -> Self {
        let textures = TransferTable::new(ClassPolicy {
            label: "texture",
            timeout_secs: config.texture_timeout_secs,
        });
        let assets = TransferTable::new(ClassPolicy {
            label: "asset",
            timeout_secs: config.asset_timeout_secs,
        });
        Self {
            config,
            textures,
            assets,
            pending: PendingQueue::new(),
            store,
            events,
            next_seq: 0,
        }
    }

    /// Name of this provider, for the dispatching asset service.
    pub fn name(&self) -> &'static str {
        "UDP asset provider"
    }

    /// Whether this provider can handle the given asset ID.
    pub fn is_valid_id(&self, asset_id: &str) -> bool {
        AssetId::is_valid(asset_id)
    }

    /// Request an asset for download.
    ///
    /// Returns `false` for a malformed or unaddressable ID so a dispatching
    /// layer can try other providers. If a transfer or pending request for
    /// this ID already exists, the tag joins its requester set and no second
    /// network request is issued.
    pub fn request_asset(
        &mut self,
        asset_id: &str,
        asset_type: AssetType,
        tag: RequestTag,
        net: &mut dyn Transport,
    ) -> bool {
        let id = match AssetId::parse(asset_id) {
            Ok(id) => id,
            Err(err) => {
                debug!("Rejecting asset request '{}': {}", asset_id, err);
                return false;
            }
        };

        {
            let table = self.table_for_mut(asset_type);
            if let Some(transfer) = table.get_mut(id) {
                transfer.add_tag(tag);
                debug!("Asset {} already in transfer, merged tag {}", id, tag);
                return true;
            }
        }
        if self.pending.add_tag(id, tag) {
            debug!("Asset {} already pending, merged tag {}", id, tag);
            return true;
        }

        if net.is_connected() {
            self.activate_transfer(
                net,
                PendingRequest {
                    id,
                    asset_type,
                    tags: vec![tag],
                    retries: 0,
                },
            );
        } else {
            debug!("No connection, queueing request for asset {}", id);
            self.pending.push(PendingRequest {
                id,
                asset_type,
                tags: vec![tag],
                retries: 0,
            });
        }
        true
    }

    /// Whether a transfer for this ID exists in either table.
    pub fn in_progress(&self, asset_id: &str) -> bool {
        match AssetId::parse(asset_id) {
            Ok(id) => self.textures.contains(id) || self.assets.contains(id),
            Err(_) => false,
        }
    }

    /// Progress snapshot for an in-flight transfer, if one exists.
    pub fn query_asset_status(&self, asset_id: &str) -> Option<AssetStatus> {
        let id = AssetId::parse(asset_id).ok()?;
        let transfer = self.textures.get(id).or_else(|| self.assets.get(id))?;
        Some(AssetStatus {
            size: transfer.size(),
            received: transfer.received(),
            received_continuous: transfer.received_continuous(),
        })
    }

    /// Copy of the continuous prefix of a partially received asset.
    ///
    /// Returns `None` unless at least `min_received` continuous bytes (and
    /// more than zero) have arrived. Allows progressive consumption, e.g.
    /// incremental texture decoding, before the transfer completes.
    pub fn get_incomplete_asset(
        &self,
        asset_id: &str,
        asset_type: AssetType,
        min_received: u32,
    ) -> Option<Vec<u8>> {
        let id = AssetId::parse(asset_id).ok()?;
        let transfer = self.table_for(asset_type).get(id)?;
        let continuous = transfer.received_continuous();
        if continuous == 0 || continuous < min_received {
            return None;
        }
        Some(transfer.continuous_data())
    }

    /// Per-tick entry point. Safe to call at irregular intervals.
    ///
    /// While connected: sweeps both tables for timeouts, then drains the
    /// pending queue. On a dropped connection every active transfer is
    /// preserved as a pending request instead of being discarded.
    pub fn update(&mut self, delta_time: f64, net: &mut dyn Transport) {
        if !net.is_connected() {
            if !self.textures.is_empty() || !self.assets.is_empty() {
                self.make_transfers_pending();
            }
            return;
        }
        self.sweep(true, delta_time);
        self.sweep(false, delta_time);
        self.flush_pending(net);
    }

    /// Feed one decoded inbound message into the engine.
    ///
    /// Messages for IDs absent from the relevant table (already completed,
    /// cancelled, or never requested) are silently dropped.
    pub fn handle_event(&mut self, event: TransferEvent) {
        match event {
            TransferEvent::TextureHeader(header) => self.on_header(true, header),
            TransferEvent::AssetHeader(header) => self.on_header(false, header),
            TransferEvent::TextureData(chunk) => self.on_chunk(true, chunk),
            TransferEvent::AssetData(chunk) => self.on_chunk(false, chunk),
            TransferEvent::TextureCancel { id } => self.on_cancel(true, id),
            TransferEvent::AssetCancel { id } => self.on_cancel(false, id),
        }
    }

    /// Number of active transfers across both tables.
    pub fn active_transfers(&self) -> usize {
        self.textures.len() + self.assets.len()
    }

    /// Number of requests waiting for a connection.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    fn table_for(&self, asset_type: AssetType) -> &TransferTable {
        if asset_type.is_texture() {
            &self.textures
        } else {
            &self.assets
        }
    }

    fn table_for_mut(&mut self, asset_type: AssetType) -> &mut TransferTable {
        if asset_type.is_texture() {
            &mut self.textures
        } else {
            &mut self.assets
        }
    }

    /// Send the wire request for an activated transfer and track it.
    fn activate_transfer(&mut self, net: &mut dyn Transport, request: PendingRequest) {
        let PendingRequest {
            id,
            asset_type,
            tags,
            retries,
        } = request;
        info!("Requesting {} {} from server", asset_type, id);
        if let Err(err) = net.send_download_request(id, asset_type) {
            // Leave the transfer in place; the timeout sweep retries it.
            warn!("Download request for {} failed: {}", id, err);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let transfer = AssetTransfer::new(id, asset_type, tags, retries, seq);
        self.table_for_mut(asset_type).insert(transfer);
    }

    fn on_header(&mut self, texture: bool, header: TransferHeader) {
        let table = if texture {
            &mut self.textures
        } else {
            &mut self.assets
        };
        let label = table.policy().label;
        match table.get_mut(header.id) {
            Some(transfer) => {
                transfer.apply_header(header.size, header.chunk_size);
                debug!(
                    "Header for {} {}: {} bytes in {} chunks",
                    label,
                    header.id,
                    header.size,
                    transfer.total_chunks().unwrap_or(0)
                );
            }
            None => debug!("Header for unknown {} {}, ignoring", label, header.id),
        }
    }

    fn on_chunk(&mut self, texture: bool, chunk: TransferChunk) {
        let table = if texture {
            &mut self.textures
        } else {
            &mut self.assets
        };
        let label = table.policy().label;
        let Some(transfer) = table.get_mut(chunk.id) else {
            debug!("Chunk for unknown {} {}, ignoring", label, chunk.id);
            return;
        };

        let outcome = transfer.apply_chunk(chunk.index, &chunk.payload);
        let progress = AssetEvent::Progress {
            id: chunk.id,
            received: transfer.received(),
            received_continuous: transfer.received_continuous(),
            size: transfer.size(),
        };

        match outcome {
            ChunkOutcome::Duplicate => {
                debug!("Duplicate chunk {} for {} {}", chunk.index, label, chunk.id);
            }
            ChunkOutcome::NoHeader => {
                debug!(
                    "Chunk {} for {} {} before header, dropping",
                    chunk.index, label, chunk.id
                );
            }
            ChunkOutcome::OutOfBounds => {
                warn!(
                    "Chunk {} for {} {} overruns declared size, dropping",
                    chunk.index, label, chunk.id
                );
            }
            ChunkOutcome::Accepted => {
                self.events.emit(progress);
            }
            ChunkOutcome::Complete => {
                self.events.emit(progress);
                let transfer = if texture {
                    self.textures.remove(chunk.id)
                } else {
                    self.assets.remove(chunk.id)
                };
                if let Some(transfer) = transfer {
                    self.complete_transfer(transfer);
                }
            }
        }
    }

    fn on_cancel(&mut self, texture: bool, id: AssetId) {
        let table = if texture {
            &mut self.textures
        } else {
            &mut self.assets
        };
        let label = table.policy().label;
        match table.remove(id) {
            Some(transfer) => {
                info!("Server cancelled {} transfer {}", label, id);
                let (_, tags) = transfer.into_parts();
                for tag in tags {
                    self.events.emit(AssetEvent::Canceled { tag, id });
                }
            }
            None => debug!("Cancel for unknown {} {}, ignoring", label, id),
        }
    }

    /// Hand a fully assembled asset to the store and notify every requester.
    fn complete_transfer(&mut self, transfer: AssetTransfer) {
        let id = transfer.id();
        let asset_type = transfer.asset_type();
        let (buffer, tags) = transfer.into_parts();
        info!("{} {} complete, {} bytes", asset_type, id, buffer.len());
        self.store.store(id, asset_type, buffer);
        for tag in tags {
            self.events.emit(AssetEvent::Completed { tag, id });
        }
    }

    /// Age one table and handle its expirations: re-queue transfers that
    /// still have retry budget, report the rest as failed.
    fn sweep(&mut self, texture: bool, delta_time: f64) {
        let (label, expired) = if texture {
            ("texture", self.textures.sweep(delta_time))
        } else {
            ("asset", self.assets.sweep(delta_time))
        };

        for transfer in expired {
            let id = transfer.id();
            let asset_type = transfer.asset_type();
            let retries = transfer.retries();
            let (_, tags) = transfer.into_parts();

            if retries >= self.config.max_retries {
                warn!(
                    "{} transfer {} failed after {} retries",
                    label, id, retries
                );
                for tag in tags {
                    self.events.emit(AssetEvent::Failed { tag, id });
                }
            } else {
                // Partial data is discarded; the server is not assumed to
                // support resuming from a byte offset.
                info!(
                    "{} transfer {} timed out, re-requesting (retry {})",
                    label,
                    id,
                    retries + 1
                );
                self.pending.push(PendingRequest {
                    id,
                    asset_type,
                    tags,
                    retries: retries + 1,
                });
            }
        }
    }

    /// Issue one wire request per queued entry, in FIFO order.
    fn flush_pending(&mut self, net: &mut dyn Transport) {
        for request in self.pending.take_all() {
            self.activate_transfer(net, request);
        }
    }

    /// Convert every active transfer back into a pending request.
    ///
    /// Called when the connection drops: partial data is discarded but the
    /// requests themselves, with their tags and retry counts, are preserved
    /// for re-issue on reconnect, in original request order.
    fn make_transfers_pending(&mut self) {
        info!(
            "Connection lost, converting {} transfers to pending requests",
            self.active_transfers()
        );
        let mut rescued = self.textures.drain_ordered();
        rescued.append(&mut self.assets.drain_ordered());
        rescued.sort_by_key(|t| t.seq());

        for transfer in rescued {
            let id = transfer.id();
            let asset_type = transfer.asset_type();
            let retries = transfer.retries();
            let (_, tags) = transfer.into_parts();
            self.pending.push(PendingRequest {
                id,
                asset_type,
                tags,
                retries,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    struct MockTransport {
        connected: bool,
        sent: Vec<(AssetId, AssetType)>,
    }

    impl MockTransport {
        fn new(connected: bool) -> Self {
            Self {
                connected,
                sent: Vec::new(),
            }
        }
    }

    impl Transport for MockTransport {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn send_download_request(
            &mut self,
            id: AssetId,
            asset_type: AssetType,
        ) -> Result<(), mirage_net::NetError> {
            if !self.connected {
                return Err(mirage_net::NetError::NotConnected);
            }
            self.sent.push((id, asset_type));
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorded {
        events: Vec<AssetEvent>,
        stored: Vec<(AssetId, AssetType, Vec<u8>)>,
    }

    struct RecordingSink(Rc<RefCell<Recorded>>);

    impl EventSink for RecordingSink {
        fn emit(&mut self, event: AssetEvent) {
            self.0.borrow_mut().events.push(event);
        }
    }

    struct RecordingStore(Rc<RefCell<Recorded>>);

    impl AssetStore for RecordingStore {
        fn store(&mut self, id: AssetId, asset_type: AssetType, data: Vec<u8>) {
            self.0.borrow_mut().stored.push((id, asset_type, data));
        }
    }

    fn provider_with(config: TransferConfig) -> (UdpAssetProvider, Rc<RefCell<Recorded>>) {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let provider = UdpAssetProvider::new(
            config,
            Box::new(RecordingStore(recorded.clone())),
            Box::new(RecordingSink(recorded.clone())),
        );
        (provider, recorded)
    }

    fn provider() -> (UdpAssetProvider, Rc<RefCell<Recorded>>) {
        provider_with(TransferConfig::default())
    }

    fn texture_header(id: AssetId, size: u32, chunk_size: u32) -> TransferEvent {
        TransferEvent::TextureHeader(TransferHeader {
            id,
            size,
            chunk_size,
        })
    }

    fn texture_chunk(id: AssetId, index: u32, payload: Vec<u8>) -> TransferEvent {
        TransferEvent::TextureData(TransferChunk { id, index, payload })
    }

    fn completions(recorded: &Rc<RefCell<Recorded>>) -> Vec<(RequestTag, AssetId)> {
        recorded
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                AssetEvent::Completed { tag, id } => Some((*tag, *id)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn malformed_id_rejected_without_state() {
        let (mut provider, _) = provider();
        let mut net = MockTransport::new(true);

        assert!(!provider.request_asset("not-a-uuid", AssetType::Texture, 1, &mut net));
        assert!(!provider.request_asset(
            "00000000-0000-0000-0000-000000000000",
            AssetType::Texture,
            1,
            &mut net
        ));
        assert!(net.sent.is_empty());
        assert_eq!(provider.active_transfers(), 0);
        assert_eq!(provider.pending_requests(), 0);
    }

    #[test]
    fn is_valid_id_matches_request_validation() {
        let (provider, _) = provider();
        assert!(provider.is_valid_id(&AssetId::new().to_string()));
        assert!(!provider.is_valid_id("garbage"));
        assert!(!provider.is_valid_id("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn out_of_order_chunks_complete_in_index_order() {
        let (mut provider, recorded) = provider();
        let mut net = MockTransport::new(true);
        let id = AssetId::new();

        assert!(provider.request_asset(&id.to_string(), AssetType::Texture, 1, &mut net));
        provider.handle_event(texture_header(id, 300, 100));
        provider.handle_event(texture_chunk(id, 1, vec![2; 100]));
        provider.handle_event(texture_chunk(id, 0, vec![1; 100]));
        provider.handle_event(texture_chunk(id, 2, vec![3; 100]));

        assert_eq!(completions(&recorded), vec![(1, id)]);
        let recorded = recorded.borrow();
        let (stored_id, _, data) = &recorded.stored[0];
        assert_eq!(*stored_id, id);
        let mut expected = vec![1u8; 100];
        expected.extend_from_slice(&[2; 100]);
        expected.extend_from_slice(&[3; 100]);
        assert_eq!(*data, expected);
        assert!(!provider.in_progress(&id.to_string()));
    }

    #[test]
    fn reassembly_is_order_independent() {
        // Every delivery permutation of three chunks yields the same bytes.
        let orders: [[u32; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        let payloads: [Vec<u8>; 3] = [vec![10; 100], vec![20; 100], vec![30; 50]];
        let mut expected = Vec::new();
        for p in &payloads {
            expected.extend_from_slice(p);
        }

        for order in orders {
            let (mut provider, recorded) = provider();
            let mut net = MockTransport::new(true);
            let id = AssetId::new();

            provider.request_asset(&id.to_string(), AssetType::Texture, 1, &mut net);
            provider.handle_event(texture_header(id, 250, 100));
            for index in order {
                provider.handle_event(texture_chunk(id, index, payloads[index as usize].clone()));
            }

            assert_eq!(recorded.borrow().stored[0].2, expected);
        }
    }

    #[test]
    fn duplicate_request_issues_one_wire_request_and_fans_out() {
        let (mut provider, recorded) = provider();
        let mut net = MockTransport::new(true);
        let id = AssetId::new();

        provider.request_asset(&id.to_string(), AssetType::Texture, 1, &mut net);
        provider.request_asset(&id.to_string(), AssetType::Texture, 2, &mut net);
        assert_eq!(net.sent.len(), 1);

        provider.handle_event(texture_header(id, 100, 100));
        provider.handle_event(texture_chunk(id, 0, vec![9; 100]));

        assert_eq!(completions(&recorded), vec![(1, id), (2, id)]);
        assert_eq!(recorded.borrow().stored.len(), 1);
    }

    #[test]
    fn query_status_reflects_progress() {
        let (mut provider, _) = provider();
        let mut net = MockTransport::new(true);
        let id = AssetId::new();

        assert!(provider.query_asset_status(&AssetId::new().to_string()).is_none());

        provider.request_asset(&id.to_string(), AssetType::Texture, 1, &mut net);
        assert_eq!(
            provider.query_asset_status(&id.to_string()),
            Some(AssetStatus {
                size: 0,
                received: 0,
                received_continuous: 0,
            })
        );

        provider.handle_event(texture_header(id, 300, 100));
        provider.handle_event(texture_chunk(id, 2, vec![0; 100]));
        assert_eq!(
            provider.query_asset_status(&id.to_string()),
            Some(AssetStatus {
                size: 300,
                received: 100,
                received_continuous: 0,
            })
        );

        provider.handle_event(texture_chunk(id, 0, vec![0; 100]));
        assert_eq!(
            provider.query_asset_status(&id.to_string()),
            Some(AssetStatus {
                size: 300,
                received: 200,
                received_continuous: 100,
            })
        );
    }

    #[test]
    fn get_incomplete_asset_honors_min_received() {
        let (mut provider, _) = provider();
        let mut net = MockTransport::new(true);
        let id = AssetId::new();
        let key = id.to_string();

        provider.request_asset(&key, AssetType::Texture, 1, &mut net);
        provider.handle_event(texture_header(id, 300, 100));

        // Nothing received yet.
        assert!(provider.get_incomplete_asset(&key, AssetType::Texture, 0).is_none());

        provider.handle_event(texture_chunk(id, 0, vec![4; 100]));
        provider.handle_event(texture_chunk(id, 2, vec![6; 100]));

        // 200 bytes received but only 100 continuous.
        assert!(provider.get_incomplete_asset(&key, AssetType::Texture, 150).is_none());
        assert_eq!(
            provider.get_incomplete_asset(&key, AssetType::Texture, 100),
            Some(vec![4; 100])
        );
    }

    #[test]
    fn zero_progress_transfer_is_rerequested_then_fails() {
        let config = TransferConfig {
            texture_timeout_secs: 10.0,
            asset_timeout_secs: 120.0,
            max_retries: 2,
        };
        let (mut provider, recorded) = provider_with(config);
        let mut net = MockTransport::new(true);
        let id = AssetId::new();

        provider.request_asset(&id.to_string(), AssetType::Texture, 7, &mut net);
        assert_eq!(net.sent.len(), 1);

        // First timeout: retry 1, re-sent within the same tick.
        provider.update(11.0, &mut net);
        assert_eq!(net.sent.len(), 2);
        assert!(provider.in_progress(&id.to_string()));

        // Second timeout: retry 2.
        provider.update(11.0, &mut net);
        assert_eq!(net.sent.len(), 3);

        // Third timeout exceeds the ceiling: terminal failure.
        provider.update(11.0, &mut net);
        assert_eq!(net.sent.len(), 3);
        assert!(!provider.in_progress(&id.to_string()));
        assert_eq!(
            recorded.borrow().events.last(),
            Some(&AssetEvent::Failed { tag: 7, id })
        );
    }

    #[test]
    fn progressing_transfer_never_times_out() {
        let config = TransferConfig {
            texture_timeout_secs: 10.0,
            asset_timeout_secs: 120.0,
            max_retries: 1,
        };
        let (mut provider, _) = provider_with(config);
        let mut net = MockTransport::new(true);
        let id = AssetId::new();

        provider.request_asset(&id.to_string(), AssetType::Texture, 1, &mut net);
        provider.handle_event(texture_header(id, 300, 100));

        // Chunks keep arriving just under the threshold; the clock resets
        // each time, so the transfer is never swept.
        for index in [0u32, 1] {
            provider.update(8.0, &mut net);
            provider.handle_event(texture_chunk(id, index, vec![0; 100]));
        }
        provider.update(8.0, &mut net);

        assert_eq!(net.sent.len(), 1);
        assert!(provider.in_progress(&id.to_string()));
    }

    #[test]
    fn partial_transfer_restarts_from_scratch_on_timeout() {
        let config = TransferConfig {
            texture_timeout_secs: 10.0,
            asset_timeout_secs: 120.0,
            max_retries: 3,
        };
        let (mut provider, _) = provider_with(config);
        let mut net = MockTransport::new(true);
        let id = AssetId::new();
        let key = id.to_string();

        provider.request_asset(&key, AssetType::Texture, 1, &mut net);
        provider.handle_event(texture_header(id, 300, 100));
        provider.handle_event(texture_chunk(id, 0, vec![1; 100]));

        provider.update(11.0, &mut net);
        assert_eq!(net.sent.len(), 2);

        // Fresh transfer: previous partial data was discarded.
        assert_eq!(
            provider.query_asset_status(&key),
            Some(AssetStatus {
                size: 0,
                received: 0,
                received_continuous: 0,
            })
        );
    }

    #[test]
    fn disconnected_requests_queue_until_connection() {
        let (mut provider, _) = provider();
        let mut net = MockTransport::new(false);
        let id = AssetId::new();

        assert!(provider.request_asset(&id.to_string(), AssetType::Mesh, 1, &mut net));
        assert!(net.sent.is_empty());
        assert_eq!(provider.pending_requests(), 1);
        assert!(!provider.in_progress(&id.to_string()));

        // Duplicate request while pending merges instead of re-queueing.
        assert!(provider.request_asset(&id.to_string(), AssetType::Mesh, 2, &mut net));
        assert_eq!(provider.pending_requests(), 1);

        net.connected = true;
        provider.update(0.016, &mut net);

        assert_eq!(net.sent.len(), 1);
        assert_eq!(provider.pending_requests(), 0);
        assert!(provider.in_progress(&id.to_string()));
    }

    #[test]
    fn disconnect_preserves_transfers_in_request_order() {
        let (mut provider, recorded) = provider();
        let mut net = MockTransport::new(true);

        let ids: Vec<AssetId> = (0..3).map(|_| AssetId::new()).collect();
        let types = [AssetType::Texture, AssetType::Mesh, AssetType::Texture];
        for (i, (&id, &ty)) in ids.iter().zip(&types).enumerate() {
            provider.request_asset(&id.to_string(), ty, i as RequestTag + 1, &mut net);
        }
        assert_eq!(net.sent.len(), 3);

        net.connected = false;
        provider.update(0.016, &mut net);
        assert_eq!(provider.active_transfers(), 0);
        assert_eq!(provider.pending_requests(), 3);

        net.connected = true;
        provider.update(0.016, &mut net);

        // Re-requested in original order, original tags intact.
        let resent: Vec<AssetId> = net.sent[3..].iter().map(|(id, _)| *id).collect();
        assert_eq!(resent, ids);
        assert_eq!(provider.active_transfers(), 3);

        // Completing one still notifies its original tag.
        provider.handle_event(texture_header(ids[0], 100, 100));
        provider.handle_event(texture_chunk(ids[0], 0, vec![1; 100]));
        assert_eq!(completions(&recorded), vec![(1, ids[0])]);
    }

    #[test]
    fn unknown_id_messages_are_ignored() {
        let (mut provider, recorded) = provider();
        let id = AssetId::new();

        provider.handle_event(texture_header(id, 100, 100));
        provider.handle_event(texture_chunk(id, 0, vec![0; 100]));
        provider.handle_event(TransferEvent::TextureCancel { id });
        provider.handle_event(TransferEvent::AssetCancel { id });

        assert_eq!(provider.active_transfers(), 0);
        assert!(recorded.borrow().events.is_empty());
        assert!(recorded.borrow().stored.is_empty());
    }

    #[test]
    fn duplicate_chunk_emits_no_progress() {
        let (mut provider, recorded) = provider();
        let mut net = MockTransport::new(true);
        let id = AssetId::new();

        provider.request_asset(&id.to_string(), AssetType::Texture, 1, &mut net);
        provider.handle_event(texture_header(id, 300, 100));
        provider.handle_event(texture_chunk(id, 0, vec![1; 100]));
        provider.handle_event(texture_chunk(id, 0, vec![2; 100]));

        let recorded = recorded.borrow();
        assert_eq!(recorded.events.len(), 1);
        assert_eq!(
            recorded.events[0],
            AssetEvent::Progress {
                id,
                received: 100,
                received_continuous: 100,
                size: 300,
            }
        );
    }

    #[test]
    fn server_cancel_is_terminal_and_fans_out() {
        let (mut provider, recorded) = provider();
        let mut net = MockTransport::new(true);
        let id = AssetId::new();

        provider.request_asset(&id.to_string(), AssetType::Texture, 1, &mut net);
        provider.request_asset(&id.to_string(), AssetType::Texture, 2, &mut net);
        provider.handle_event(TransferEvent::TextureCancel { id });

        assert!(!provider.in_progress(&id.to_string()));
        assert_eq!(
            recorded.borrow().events,
            vec![
                AssetEvent::Canceled { tag: 1, id },
                AssetEvent::Canceled { tag: 2, id },
            ]
        );

        // A late chunk for the cancelled ID is ignored and nothing retries.
        provider.handle_event(texture_chunk(id, 0, vec![0; 100]));
        provider.update(1000.0, &mut net);
        assert_eq!(net.sent.len(), 1);
        assert!(!provider.in_progress(&id.to_string()));
    }

    #[test]
    fn texture_and_asset_tables_are_independent() {
        let (mut provider, recorded) = provider();
        let mut net = MockTransport::new(true);
        let id = AssetId::new();

        provider.request_asset(&id.to_string(), AssetType::Mesh, 1, &mut net);

        // Texture-path messages must not touch the generic asset transfer.
        provider.handle_event(texture_header(id, 100, 100));
        provider.handle_event(texture_chunk(id, 0, vec![0; 100]));
        assert!(recorded.borrow().events.is_empty());

        provider.handle_event(TransferEvent::AssetHeader(TransferHeader {
            id,
            size: 100,
            chunk_size: 100,
        }));
        provider.handle_event(TransferEvent::AssetData(TransferChunk {
            id,
            index: 0,
            payload: vec![3; 100],
        }));
        assert_eq!(completions(&recorded), vec![(1, id)]);
        assert_eq!(recorded.borrow().stored[0].1, AssetType::Mesh);
    }

    #[test]
    fn classes_use_their_own_timeouts() {
        let config = TransferConfig {
            texture_timeout_secs: 10.0,
            asset_timeout_secs: 100.0,
            max_retries: 3,
        };
        let (mut provider, _) = provider_with(config);
        let mut net = MockTransport::new(true);
        let texture = AssetId::new();
        let mesh = AssetId::new();

        provider.request_asset(&texture.to_string(), AssetType::Texture, 1, &mut net);
        provider.request_asset(&mesh.to_string(), AssetType::Mesh, 2, &mut net);
        assert_eq!(net.sent.len(), 2);

        // Past the texture threshold, under the asset threshold.
        provider.update(50.0, &mut net);
        assert_eq!(net.sent.len(), 3);
        assert_eq!(net.sent[2].0, texture);
    }

    #[test]
    fn data_before_header_leaves_transfer_untouched() {
        let (mut provider, recorded) = provider();
        let mut net = MockTransport::new(true);
        let id = AssetId::new();
        let key = id.to_string();

        provider.request_asset(&key, AssetType::Texture, 1, &mut net);
        provider.handle_event(texture_chunk(id, 0, vec![1; 100]));

        assert!(recorded.borrow().events.is_empty());
        assert_eq!(
            provider.query_asset_status(&key),
            Some(AssetStatus {
                size: 0,
                received: 0,
                received_continuous: 0,
            })
        );
    }
}
