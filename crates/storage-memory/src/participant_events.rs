//! Per-participant bounded windows of event hashes.

use poset_storage::{RollingIndex, StoreError, StoreErrorKind};
use poset_types::{EventHash, PeerId, Peers};
use std::collections::HashMap;
use std::sync::Arc;

const NAMESPACE: &str = "ParticipantEvents";

/// Bounded per-participant windows of event hashes, addressed by each
/// creator's own monotonically increasing event index.
///
/// One [`RollingIndex`] per registered peer. The windows are bounded, but
/// the highest index ever assigned per participant survives eviction, so
/// [`known`](Self::known) stays accurate after old entries roll off.
///
/// Participants are named by public key and resolved against the live peer
/// set; an unknown key fails with `NoRoot` before any state is touched.
#[derive(Debug)]
pub struct ParticipantEventsCache {
    size: usize,
    participants: Arc<Peers>,
    windows: HashMap<PeerId, RollingIndex<EventHash>>,
}

impl ParticipantEventsCache {
    /// Create windows for every peer currently in `participants`.
    pub fn new(size: usize, participants: Arc<Peers>) -> Self {
        let windows = participants
            .ids()
            .into_iter()
            .map(|id| (id, RollingIndex::new(NAMESPACE, size)))
            .collect();
        Self {
            size,
            participants,
            windows,
        }
    }

    fn peer_id(&self, participant: &str) -> Result<PeerId, StoreError> {
        self.participants
            .by_pub_key(participant)
            .map(|peer| peer.id)
            .ok_or_else(|| StoreError::new(NAMESPACE, StoreErrorKind::NoRoot, participant))
    }

    fn window(&self, participant: &str) -> Result<&RollingIndex<EventHash>, StoreError> {
        let id = self.peer_id(participant)?;
        self.windows
            .get(&id)
            .ok_or_else(|| StoreError::new(NAMESPACE, StoreErrorKind::NoRoot, participant))
    }

    /// Hashes from `participant` with index strictly greater than `skip`.
    pub fn get(&self, participant: &str, skip: i64) -> Result<Vec<EventHash>, StoreError> {
        Ok(self.window(participant)?.get(skip))
    }

    /// Exact-index lookup within the retained window.
    pub fn get_item(&self, participant: &str, index: i64) -> Result<EventHash, StoreError> {
        self.window(participant)?.get_item(index)
    }

    /// Highest retained hash for `participant`; `Empty` when it has none.
    pub fn get_last(&self, participant: &str) -> Result<EventHash, StoreError> {
        self.window(participant)?
            .get_last()
            .ok_or_else(|| StoreError::new(NAMESPACE, StoreErrorKind::Empty, participant))
    }

    /// Append `hash` at `index` for `participant`.
    ///
    /// `index` must be the participant's next expected index; the window
    /// rejects gaps (`SkippedIndex`) and writes below its low bound
    /// (`TooLow`).
    pub fn set(
        &mut self,
        participant: &str,
        hash: EventHash,
        index: i64,
    ) -> Result<(), StoreError> {
        let id = self.peer_id(participant)?;
        let size = self.size;
        self.windows
            .entry(id)
            .or_insert_with(|| RollingIndex::new(NAMESPACE, size))
            .set(hash, index)
    }

    /// Highest index ever assigned per peer id; −1 for peers with no events
    /// seen.
    pub fn known(&self) -> HashMap<PeerId, i64> {
        self.windows
            .iter()
            .map(|(id, window)| (*id, window.last_index()))
            .collect()
    }

    /// Copy another cache's windows in, preserving history across a
    /// participant-set change.
    pub fn import(&mut self, other: &ParticipantEventsCache) {
        for (id, window) in &other.windows {
            self.windows.insert(*id, window.clone());
        }
    }

    /// Clear every window, keeping the registered participants.
    pub fn reset(&mut self) {
        for window in self.windows.values_mut() {
            window.reset();
        }
    }
}
