//! Store eligibility filters.
//!
//! A [`StoreStateFilter`] answers two questions about a store: may it act
//! as the *source* of an operator (give up a leader or a replica), and may
//! it act as the *target* (receive one). Which checks apply depends on the
//! operation the filter was built for.

use hotspot_placement::StoreInfo;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStateFilter {
    /// Checks for moving leadership between existing replicas.
    pub transfer_leader: bool,
    /// Checks for moving a replica onto another store.
    pub move_region: bool,
}

impl StoreStateFilter {
    pub fn transfer_leader() -> Self {
        Self {
            transfer_leader: true,
            move_region: false,
        }
    }

    pub fn move_region() -> Self {
        Self {
            transfer_leader: false,
            move_region: true,
        }
    }

    /// Whether `store` may give up a leader or replica. A missing store
    /// never may.
    pub fn allows_source(&self, store: Option<&StoreInfo>) -> bool {
        let Some(store) = store else {
            return false;
        };
        if store.is_tombstone() || store.disconnected {
            return false;
        }
        if self.transfer_leader && store.leader_transfer_paused {
            return false;
        }
        true
    }

    /// Whether `store` may receive a leader or replica. A missing store
    /// never may.
    pub fn allows_target(&self, store: Option<&StoreInfo>) -> bool {
        let Some(store) = store else {
            return false;
        };
        if !store.is_up() || store.disconnected || store.busy {
            return false;
        }
        if self.transfer_leader && store.leader_transfer_paused {
            return false;
        }
        if self.move_region && store.low_space {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotspot_placement::StoreState;

    #[test]
    fn healthy_store_passes_both_sides() {
        let store = StoreInfo::new(1);
        for f in [StoreStateFilter::transfer_leader(), StoreStateFilter::move_region()] {
            assert!(f.allows_source(Some(&store)));
            assert!(f.allows_target(Some(&store)));
        }
    }

    #[test]
    fn missing_store_is_rejected() {
        let f = StoreStateFilter::transfer_leader();
        assert!(!f.allows_source(None));
        assert!(!f.allows_target(None));
    }

    #[test]
    fn disconnected_store_is_rejected() {
        let mut store = StoreInfo::new(1);
        store.disconnected = true;
        let f = StoreStateFilter::transfer_leader();
        assert!(!f.allows_source(Some(&store)));
        assert!(!f.allows_target(Some(&store)));
    }

    #[test]
    fn offline_store_can_give_but_not_receive() {
        let mut store = StoreInfo::new(1);
        store.state = StoreState::Offline;
        let f = StoreStateFilter::move_region();
        assert!(f.allows_source(Some(&store)));
        assert!(!f.allows_target(Some(&store)));
    }

    #[test]
    fn paused_leader_transfer_only_blocks_leader_moves() {
        let mut store = StoreInfo::new(1);
        store.leader_transfer_paused = true;
        assert!(!StoreStateFilter::transfer_leader().allows_target(Some(&store)));
        assert!(!StoreStateFilter::transfer_leader().allows_source(Some(&store)));
        assert!(StoreStateFilter::move_region().allows_target(Some(&store)));
    }

    #[test]
    fn low_space_only_blocks_replica_moves() {
        let mut store = StoreInfo::new(1);
        store.low_space = true;
        assert!(!StoreStateFilter::move_region().allows_target(Some(&store)));
        assert!(StoreStateFilter::transfer_leader().allows_target(Some(&store)));
    }
}
