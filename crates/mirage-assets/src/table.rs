//! Keyed collection of active transfers for one asset class
//!
//! Textures and generic assets use different wire messages and timeout
//! policies but identical bookkeeping, so both classes share this table and
//! differ only in their [`ClassPolicy`].

use std::collections::HashMap;

use mirage_core::AssetId;

use crate::transfer::AssetTransfer;

/// Per-class transfer policy.
#[derive(Debug, Clone, Copy)]
pub struct ClassPolicy {
    /// Class label used in logs ("texture" or "asset").
    pub label: &'static str,
    /// Seconds a transfer may sit without progress before it is retried.
    pub timeout_secs: f64,
}

/// Active transfers of one asset class, keyed by asset ID.
#[derive(Debug)]
pub struct TransferTable {
    policy: ClassPolicy,
    transfers: HashMap<AssetId, AssetTransfer>,
}

impl TransferTable {
    pub fn new(policy: ClassPolicy) -> Self {
        Self {
            policy,
            transfers: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &ClassPolicy {
        &self.policy
    }

    /// Insert a transfer. At most one transfer may exist per asset ID; an
    /// existing record for the same ID is replaced and returned.
    pub fn insert(&mut self, transfer: AssetTransfer) -> Option<AssetTransfer> {
        self.transfers.insert(transfer.id(), transfer)
    }

    pub fn get(&self, id: AssetId) -> Option<&AssetTransfer> {
        self.transfers.get(&id)
    }

    pub fn get_mut(&mut self, id: AssetId) -> Option<&mut AssetTransfer> {
        self.transfers.get_mut(&id)
    }

    pub fn remove(&mut self, id: AssetId) -> Option<AssetTransfer> {
        self.transfers.remove(&id)
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.transfers.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    /// Age every transfer by `delta_time` and extract the ones that exceeded
    /// this class's timeout.
    ///
    /// Expired records are collected first and removed after the scan, so
    /// the table is never mutated mid-iteration.
    pub fn sweep(&mut self, delta_time: f64) -> Vec<AssetTransfer> {
        let mut expired = Vec::new();
        for (id, transfer) in self.transfers.iter_mut() {
            transfer.tick(delta_time);
            if transfer.age() > self.policy.timeout_secs {
                expired.push(*id);
            }
        }

        let mut removed: Vec<AssetTransfer> = expired
            .into_iter()
            .filter_map(|id| self.transfers.remove(&id))
            .collect();
        // Present expirations in original request order.
        removed.sort_by_key(|t| t.seq());
        removed
    }

    /// Remove every transfer, in original request order.
    pub fn drain_ordered(&mut self) -> Vec<AssetTransfer> {
        let mut all: Vec<AssetTransfer> = self.transfers.drain().map(|(_, t)| t).collect();
        all.sort_by_key(|t| t.seq());
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirage_core::AssetType;

    fn table(timeout: f64) -> TransferTable {
        TransferTable::new(ClassPolicy {
            label: "texture",
            timeout_secs: timeout,
        })
    }

    fn transfer(seq: u64) -> AssetTransfer {
        AssetTransfer::new(AssetId::new(), AssetType::Texture, vec![1], 0, seq)
    }

    #[test]
    fn sweep_expires_only_stale_transfers() {
        let mut table = table(10.0);
        let fresh = transfer(0);
        let stale = transfer(1);
        let stale_id = stale.id();

        table.insert(fresh);
        table.insert(stale);
        table.get_mut(stale_id).unwrap().tick(8.0);

        let expired = table.sweep(3.0);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id(), stale_id);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn sweep_ages_survivors() {
        let mut table = table(10.0);
        let t = transfer(0);
        let id = t.id();
        table.insert(t);

        assert!(table.sweep(4.0).is_empty());
        assert!(table.get(id).unwrap().age() > 3.9);
    }

    #[test]
    fn drain_preserves_request_order() {
        let mut table = table(10.0);
        let ids: Vec<AssetId> = (0..5)
            .map(|seq| {
                let t = transfer(seq);
                let id = t.id();
                table.insert(t);
                id
            })
            .collect();

        let drained: Vec<AssetId> = table.drain_ordered().iter().map(|t| t.id()).collect();
        assert_eq!(drained, ids);
        assert!(table.is_empty());
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut table = table(10.0);
        let t = transfer(0);
        let id = t.id();
        table.insert(t);
        let replacement = AssetTransfer::new(id, AssetType::Texture, vec![2], 1, 1);
        assert!(table.insert(replacement).is_some());
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(id).unwrap().tags(), &[2]);
    }
}
