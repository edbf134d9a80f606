//! Read-only view of the live cluster topology.
//!
//! The scheduling core never mutates the cluster: it reads regions and
//! stores through [`ClusterView`] on every call. [`MemoryCluster`] is an
//! in-process implementation loaded from a JSON topology snapshot, used by
//! the daemon's dry-run host and by tests.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use hotspot_core::{RegionId, StoreId};

/// Region start keys are matched against forecast table ranges in
/// uppercase hex.
pub fn hex_region_key(key: &[u8]) -> String {
    hex::encode_upper(key)
}

/// One replica of a region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Peer {
    pub id: u64,
    pub store_id: StoreId,
}

/// A region as seen by the placement driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionInfo {
    pub id: RegionId,
    #[serde(with = "hex::serde", default)]
    pub start_key: Vec<u8>,
    #[serde(with = "hex::serde", default)]
    pub end_key: Vec<u8>,
    pub peers: Vec<Peer>,
    pub leader: Option<Peer>,
    /// Approximate region size in bytes.
    #[serde(default)]
    pub approximate_size: u64,
    /// Cumulative bytes read since the region was reported.
    #[serde(default)]
    pub read_bytes: u64,
    /// Cumulative bytes written since the region was reported.
    #[serde(default)]
    pub written_bytes: u64,
}

impl RegionInfo {
    pub fn leader_store_id(&self) -> Option<StoreId> {
        self.leader.map(|p| p.store_id)
    }

    pub fn peer_on(&self, store_id: StoreId) -> Option<&Peer> {
        self.peers.iter().find(|p| p.store_id == store_id)
    }

    pub fn has_peer_on(&self, store_id: StoreId) -> bool {
        self.peer_on(store_id).is_some()
    }

    pub fn store_ids(&self) -> Vec<StoreId> {
        self.peers.iter().map(|p| p.store_id).collect()
    }

    /// Total read plus written bytes.
    pub fn rw_bytes_total(&self) -> u64 {
        self.read_bytes.saturating_add(self.written_bytes)
    }

    /// Start key in the encoding used by forecast table ranges.
    pub fn hex_start_key(&self) -> String {
        hex_region_key(&self.start_key)
    }
}

/// Lifecycle state of a store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreState {
    #[default]
    Up,
    /// Being decommissioned; still serving but should not receive data.
    Offline,
    /// Removed from the cluster.
    Tombstone,
}

/// A store as seen by the placement driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreInfo {
    pub id: StoreId,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub state: StoreState,
    /// No heartbeat received recently.
    #[serde(default)]
    pub disconnected: bool,
    /// Store reported itself as busy.
    #[serde(default)]
    pub busy: bool,
    /// Leader transfers in or out of this store are paused.
    #[serde(default)]
    pub leader_transfer_paused: bool,
    /// Store is running out of disk space.
    #[serde(default)]
    pub low_space: bool,
}

impl StoreInfo {
    pub fn new(id: StoreId) -> Self {
        Self {
            id,
            address: String::new(),
            state: StoreState::Up,
            disconnected: false,
            busy: false,
            leader_transfer_paused: false,
            low_space: false,
        }
    }

    pub fn is_up(&self) -> bool {
        self.state == StoreState::Up
    }

    pub fn is_tombstone(&self) -> bool {
        self.state == StoreState::Tombstone
    }
}

/// Read access to cluster topology and limits.
pub trait ClusterView: Send + Sync {
    fn region(&self, id: RegionId) -> Option<RegionInfo>;

    /// Every region, in a stable order.
    fn regions(&self) -> Vec<RegionInfo>;

    fn store(&self, id: StoreId) -> Option<StoreInfo>;

    /// Configured limit on concurrently running region operators.
    fn region_schedule_limit(&self) -> u64;

    /// Allocate an id for a new peer. `None` when allocation fails.
    fn alloc_peer_id(&self) -> Option<u64>;
}

/// Serialized form of a cluster topology.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub stores: Vec<StoreInfo>,
    #[serde(default)]
    pub regions: Vec<RegionInfo>,
    #[serde(default = "default_region_schedule_limit")]
    pub region_schedule_limit: u64,
}

fn default_region_schedule_limit() -> u64 {
    4
}

struct Topology {
    stores: HashMap<StoreId, StoreInfo>,
    regions: BTreeMap<RegionId, RegionInfo>,
    region_schedule_limit: u64,
}

/// In-memory [`ClusterView`].
pub struct MemoryCluster {
    topology: RwLock<Topology>,
    next_peer_id: AtomicU64,
    peer_allocation_enabled: AtomicBool,
}

impl MemoryCluster {
    pub fn new(snapshot: ClusterSnapshot) -> Self {
        let max_peer = snapshot
            .regions
            .iter()
            .flat_map(|r| r.peers.iter().map(|p| p.id))
            .max()
            .unwrap_or(0);

        Self {
            topology: RwLock::new(Topology {
                stores: snapshot.stores.into_iter().map(|s| (s.id, s)).collect(),
                regions: snapshot.regions.into_iter().map(|r| (r.id, r)).collect(),
                region_schedule_limit: snapshot.region_schedule_limit,
            }),
            next_peer_id: AtomicU64::new(max_peer + 1),
            peer_allocation_enabled: AtomicBool::new(true),
        }
    }

    /// Load a topology snapshot from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: ClusterSnapshot = serde_json::from_str(&content)?;
        Ok(Self::new(snapshot))
    }

    pub fn put_region(&self, region: RegionInfo) {
        let mut topo = self.topology.write().unwrap_or_else(PoisonError::into_inner);
        topo.regions.insert(region.id, region);
    }

    pub fn remove_region(&self, id: RegionId) -> Option<RegionInfo> {
        let mut topo = self.topology.write().unwrap_or_else(PoisonError::into_inner);
        topo.regions.remove(&id)
    }

    pub fn put_store(&self, store: StoreInfo) {
        let mut topo = self.topology.write().unwrap_or_else(PoisonError::into_inner);
        topo.stores.insert(store.id, store);
    }

    pub fn set_region_schedule_limit(&self, limit: u64) {
        let mut topo = self.topology.write().unwrap_or_else(PoisonError::into_inner);
        topo.region_schedule_limit = limit;
    }

    /// Make subsequent [`ClusterView::alloc_peer_id`] calls fail (or succeed again).
    pub fn set_peer_allocation(&self, enabled: bool) {
        self.peer_allocation_enabled.store(enabled, Ordering::Relaxed);
    }
}

impl Default for MemoryCluster {
    fn default() -> Self {
        Self::new(ClusterSnapshot {
            region_schedule_limit: default_region_schedule_limit(),
            ..ClusterSnapshot::default()
        })
    }
}

impl ClusterView for MemoryCluster {
    fn region(&self, id: RegionId) -> Option<RegionInfo> {
        let topo = self.topology.read().unwrap_or_else(PoisonError::into_inner);
        topo.regions.get(&id).cloned()
    }

    fn regions(&self) -> Vec<RegionInfo> {
        let topo = self.topology.read().unwrap_or_else(PoisonError::into_inner);
        topo.regions.values().cloned().collect()
    }

    fn store(&self, id: StoreId) -> Option<StoreInfo> {
        let topo = self.topology.read().unwrap_or_else(PoisonError::into_inner);
        topo.stores.get(&id).cloned()
    }

    fn region_schedule_limit(&self) -> u64 {
        let topo = self.topology.read().unwrap_or_else(PoisonError::into_inner);
        topo.region_schedule_limit
    }

    fn alloc_peer_id(&self) -> Option<u64> {
        if !self.peer_allocation_enabled.load(Ordering::Relaxed) {
            return None;
        }
        Some(self.next_peer_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: &str = r#"{
        "stores": [
            {"id": 1, "address": "tikv-1:20160"},
            {"id": 2, "address": "tikv-2:20160", "state": "offline"}
        ],
        "regions": [
            {"id": 10, "start_key": "7480", "end_key": "7490",
             "peers": [{"id": 100, "store_id": 1}, {"id": 101, "store_id": 2}],
             "leader": {"id": 100, "store_id": 1},
             "approximate_size": 96, "read_bytes": 1000, "written_bytes": 24}
        ],
        "region_schedule_limit": 8
    }"#;

    fn cluster() -> MemoryCluster {
        MemoryCluster::new(serde_json::from_str(TOPOLOGY).unwrap())
    }

    #[test]
    fn loads_topology_snapshot() {
        let c = cluster();
        assert_eq!(c.region_schedule_limit(), 8);
        assert_eq!(c.regions().len(), 1);
        assert_eq!(c.store(2).unwrap().state, StoreState::Offline);
        assert!(c.store(3).is_none());

        let region = c.region(10).unwrap();
        assert_eq!(region.start_key, vec![0x74, 0x80]);
        assert_eq!(region.leader_store_id(), Some(1));
        assert_eq!(region.rw_bytes_total(), 1024);
        assert_eq!(region.hex_start_key(), "7480");
    }

    #[test]
    fn peer_lookup_by_store() {
        let region = cluster().region(10).unwrap();
        assert!(region.has_peer_on(2));
        assert!(!region.has_peer_on(3));
        assert_eq!(region.store_ids(), vec![1, 2]);
    }

    #[test]
    fn hex_key_is_uppercase() {
        assert_eq!(hex_region_key(&[0xab, 0x01]), "AB01");
        assert_eq!(hex_region_key(&[]), "");
    }

    #[test]
    fn peer_ids_continue_after_existing_peers() {
        let c = cluster();
        assert_eq!(c.alloc_peer_id(), Some(102));
        assert_eq!(c.alloc_peer_id(), Some(103));

        c.set_peer_allocation(false);
        assert_eq!(c.alloc_peer_id(), None);
    }

    #[test]
    fn regions_can_be_removed_and_replaced() {
        let c = cluster();
        let mut region = c.region(10).unwrap();
        region.read_bytes = 0;
        c.put_region(region);
        assert_eq!(c.region(10).unwrap().read_bytes, 0);

        assert!(c.remove_region(10).is_some());
        assert!(c.region(10).is_none());
    }

    #[test]
    fn missing_limit_defaults() {
        let snapshot: ClusterSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot.region_schedule_limit, 4);
    }
}
