//! In-memory consensus store.
//!
//! The authoritative in-process repository of everything the consensus
//! algorithm produces: events, per-participant indices, roots, the rolling
//! consensus order, rounds, blocks, and frames.
//!
//! # Interior Mutability
//!
//! Every collection has its own lock so all methods can take `&self` and the
//! store can be shared across the engine's threads:
//!
//! - bounded maps: `Mutex<LruCache>` (reads refresh recency)
//! - counters and windows: `RwLock`
//! - read-mostly membership state (repertoire pair, roots, derived reverse
//!   index): `arc_swap`, replaced whole so readers never lock
//!
//! Lock order, outermost first, for operations that hold more than one:
//! `last_round`, `last_block`, the LRU maps (event, round-created,
//! round-received, block, frame), the consensus window, the participant
//! windows, the last-consensus-events map.

use crate::ParticipantEventsCache;
use arc_swap::{ArcSwap, ArcSwapOption};
use lru::LruCache;
use poset_storage::{
    ConfigError, PosetStore, RollingIndex, StoreConfig, StoreError, StoreErrorKind,
};
use poset_types::{
    Block, Event, EventHash, Frame, Peer, PeerId, Peers, Root, RoundCreated, RoundReceived,
    SubscriptionId,
};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

/// Immutable mirror pair of peer lookups, replaced atomically when the
/// participant set grows.
#[derive(Debug)]
struct Repertoire {
    by_pub_key: Arc<HashMap<String, Arc<Peer>>>,
    by_id: Arc<HashMap<PeerId, Arc<Peer>>>,
}

impl Repertoire {
    fn from_peers(peers: &Peers) -> Self {
        let mut by_pub_key = HashMap::new();
        let mut by_id = HashMap::new();
        for peer in peers.all() {
            by_pub_key.insert(peer.pub_key_hex.clone(), peer.clone());
            by_id.insert(peer.id, peer);
        }
        Self {
            by_pub_key: Arc::new(by_pub_key),
            by_id: Arc::new(by_id),
        }
    }

    fn with_peer(&self, peer: &Arc<Peer>) -> Self {
        let mut by_pub_key = (*self.by_pub_key).clone();
        let mut by_id = (*self.by_id).clone();
        by_pub_key.insert(peer.pub_key_hex.clone(), peer.clone());
        by_id.insert(peer.id, peer.clone());
        Self {
            by_pub_key: Arc::new(by_pub_key),
            by_id: Arc::new(by_id),
        }
    }
}

/// In-memory implementation of [`PosetStore`].
///
/// Bounded memory: each map retains at most
/// [`cache_size`](PosetStore::cache_size) entries, and the consensus order
/// keeps only a rolling suffix while its total count stays monotone. Evicted
/// entries surface as `KeyNotFound`; higher layers re-request them from the
/// network or fall back to the participant indices and roots.
///
/// Constructed with [`InmemStore::new`], which subscribes to peer additions:
/// a joining peer gets a synthesized base root, both repertoire mirrors are
/// extended, the derived reverse root-index is invalidated, and the
/// participant windows are rebuilt with prior history imported.
#[derive(Debug)]
pub struct InmemStore {
    cache_size: NonZeroUsize,
    clear_derived_on_reset: bool,
    participants: Arc<Peers>,

    event_cache: Mutex<LruCache<EventHash, Event>>,
    round_created_cache: Mutex<LruCache<i64, RoundCreated>>,
    round_received_cache: Mutex<LruCache<i64, RoundReceived>>,
    block_cache: Mutex<LruCache<i64, Block>>,
    frame_cache: Mutex<LruCache<i64, Frame>>,

    /// Rolling consensus-order log. Its write lock also guards the total
    /// consensus-events count, which the log tracks across eviction.
    consensus_cache: RwLock<RollingIndex<EventHash>>,

    repertoire: ArcSwap<Repertoire>,
    participant_events: RwLock<ParticipantEventsCache>,
    roots_by_participant: ArcSwap<HashMap<String, Root>>,
    /// Derived reverse index; `None` marks it invalidated.
    roots_by_self_parent: ArcSwapOption<HashMap<EventHash, Root>>,

    last_round: RwLock<i64>,
    last_block: RwLock<i64>,
    last_consensus_events: Mutex<HashMap<String, EventHash>>,

    subscription: Mutex<Option<SubscriptionId>>,
}

impl InmemStore {
    /// Create a store over `participants`.
    ///
    /// Synthesizes a base root for every current participant and subscribes
    /// to peer additions. Returns an `Arc` because the subscription holds a
    /// weak back-reference into the store; [`close`](PosetStore::close)
    /// drops the subscription.
    pub fn new(participants: Arc<Peers>, config: StoreConfig) -> Result<Arc<Self>, ConfigError> {
        let cache_size =
            NonZeroUsize::new(config.cache_size).ok_or(ConfigError::ZeroCacheSize)?;

        let mut roots = HashMap::new();
        for peer in participants.all() {
            roots.insert(peer.pub_key_hex.clone(), Root::base(peer.id));
        }

        let store = Arc::new(Self {
            cache_size,
            clear_derived_on_reset: config.clear_derived_on_reset,
            participants: participants.clone(),
            event_cache: Mutex::new(LruCache::new(cache_size)),
            round_created_cache: Mutex::new(LruCache::new(cache_size)),
            round_received_cache: Mutex::new(LruCache::new(cache_size)),
            block_cache: Mutex::new(LruCache::new(cache_size)),
            frame_cache: Mutex::new(LruCache::new(cache_size)),
            consensus_cache: RwLock::new(RollingIndex::new("ConsensusCache", cache_size.get())),
            repertoire: ArcSwap::from_pointee(Repertoire::from_peers(&participants)),
            participant_events: RwLock::new(ParticipantEventsCache::new(
                cache_size.get(),
                participants.clone(),
            )),
            roots_by_participant: ArcSwap::from_pointee(roots),
            roots_by_self_parent: ArcSwapOption::new(None),
            last_round: RwLock::new(-1),
            last_block: RwLock::new(-1),
            last_consensus_events: Mutex::new(HashMap::new()),
            subscription: Mutex::new(None),
        });

        let weak = Arc::downgrade(&store);
        let subscription = participants.on_new_peer(move |peer| {
            if let Some(store) = weak.upgrade() {
                store.register_peer(peer);
            }
        });
        *store.subscription.lock().unwrap() = Some(subscription);

        Ok(store)
    }

    /// Fold a newly added peer into the derived state: base root, repertoire
    /// mirrors, reverse-index invalidation, and a rebuilt participant-events
    /// cache importing prior history.
    fn register_peer(&self, peer: &Peer) {
        let peer = Arc::new(peer.clone());

        let mut roots = (**self.roots_by_participant.load()).clone();
        roots.insert(peer.pub_key_hex.clone(), Root::base(peer.id));
        self.roots_by_participant.store(Arc::new(roots));

        let repertoire = self.repertoire.load_full();
        self.repertoire.store(Arc::new(repertoire.with_peer(&peer)));
        self.roots_by_self_parent.store(None);

        {
            let mut windows = self.participant_events.write().unwrap();
            let mut fresh =
                ParticipantEventsCache::new(self.cache_size.get(), self.participants.clone());
            fresh.import(&windows);
            *windows = fresh;
        }

        debug!(participant = %peer.pub_key_hex, id = %peer.id, "registered new participant");
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PosetStore implementation
// ═══════════════════════════════════════════════════════════════════════

impl PosetStore for InmemStore {
    fn cache_size(&self) -> usize {
        self.cache_size.get()
    }

    fn participants(&self) -> Arc<Peers> {
        self.participants.clone()
    }

    fn repertoire_by_pub_key(&self) -> Arc<HashMap<String, Arc<Peer>>> {
        self.repertoire.load().by_pub_key.clone()
    }

    fn repertoire_by_id(&self) -> Arc<HashMap<PeerId, Arc<Peer>>> {
        self.repertoire.load().by_id.clone()
    }

    fn roots_by_self_parent(&self) -> Result<Arc<HashMap<EventHash, Root>>, StoreError> {
        if let Some(cached) = self.roots_by_self_parent.load_full() {
            return Ok(cached);
        }

        let roots = self.roots_by_participant.load();
        let mut by_self_parent = HashMap::with_capacity(roots.len());
        for root in roots.values() {
            by_self_parent.insert(root.self_parent.hash, root.clone());
        }
        let rebuilt = Arc::new(by_self_parent);
        self.roots_by_self_parent.store(Some(rebuilt.clone()));
        Ok(rebuilt)
    }

    fn get_event_block(&self, hash: &EventHash) -> Result<Event, StoreError> {
        self.event_cache
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .ok_or_else(|| {
                StoreError::new("EventCache", StoreErrorKind::KeyNotFound, hash.to_hex())
            })
    }

    fn set_event(&self, event: Event) -> Result<(), StoreError> {
        let hash = event.hash();
        let known = self.event_cache.lock().unwrap().contains(&hash);
        if !known {
            self.participant_events
                .write()
                .unwrap()
                .set(event.creator(), hash, event.index())?;
        }
        self.event_cache.lock().unwrap().put(hash, event);
        Ok(())
    }

    fn participant_events(
        &self,
        participant: &str,
        skip: i64,
    ) -> Result<Vec<EventHash>, StoreError> {
        self.participant_events.read().unwrap().get(participant, skip)
    }

    fn participant_event(&self, participant: &str, index: i64) -> Result<EventHash, StoreError> {
        let lookup = self
            .participant_events
            .read()
            .unwrap()
            .get_item(participant, index);
        match lookup {
            Ok(hash) => Ok(hash),
            Err(err) => {
                let roots = self.roots_by_participant.load();
                let root = roots.get(participant).ok_or_else(|| {
                    StoreError::new("Roots", StoreErrorKind::NoRoot, participant)
                })?;
                if root.self_parent.index == index {
                    Ok(root.self_parent.hash)
                } else {
                    Err(err)
                }
            }
        }
    }

    fn last_event_from(&self, participant: &str) -> Result<(EventHash, bool), StoreError> {
        match self.participant_events.read().unwrap().get_last(participant) {
            Ok(hash) => Ok((hash, false)),
            Err(err) if err.is(StoreErrorKind::Empty) => {
                let roots = self.roots_by_participant.load();
                match roots.get(participant) {
                    Some(root) => Ok((root.self_parent.hash, true)),
                    None => Err(StoreError::new(
                        "Roots",
                        StoreErrorKind::NoRoot,
                        participant,
                    )),
                }
            }
            Err(err) => Err(err),
        }
    }

    fn last_consensus_event_from(
        &self,
        participant: &str,
    ) -> Result<(EventHash, bool), StoreError> {
        if let Some(hash) = self.last_consensus_events.lock().unwrap().get(participant) {
            return Ok((*hash, false));
        }
        let roots = self.roots_by_participant.load();
        match roots.get(participant) {
            Some(root) => Ok((root.self_parent.hash, true)),
            None => Err(StoreError::new(
                "Roots",
                StoreErrorKind::NoRoot,
                participant,
            )),
        }
    }

    fn known_events(&self) -> HashMap<PeerId, i64> {
        let mut known = self.participant_events.read().unwrap().known();
        let roots = self.roots_by_participant.load();
        let repertoire = self.repertoire.load();
        for (pub_key, peer) in repertoire.by_pub_key.iter() {
            let head = known.entry(peer.id).or_insert(-1);
            if *head == -1 {
                if let Some(root) = roots.get(pub_key) {
                    *head = root.self_parent.index;
                }
            }
        }
        known
    }

    fn consensus_events(&self) -> Vec<EventHash> {
        self.consensus_cache.read().unwrap().last_window()
    }

    fn consensus_events_count(&self) -> i64 {
        self.consensus_cache.read().unwrap().total_count()
    }

    fn add_consensus_event(&self, event: &Event) -> Result<(), StoreError> {
        let mut consensus = self.consensus_cache.write().unwrap();
        let position = consensus.total_count();
        consensus.set(event.hash(), position)?;
        self.last_consensus_events
            .lock()
            .unwrap()
            .insert(event.creator().to_string(), event.hash());
        Ok(())
    }

    fn get_round_created(&self, round: i64) -> Result<RoundCreated, StoreError> {
        self.round_created_cache
            .lock()
            .unwrap()
            .get(&round)
            .cloned()
            .ok_or_else(|| {
                StoreError::new(
                    "RoundCreatedCache",
                    StoreErrorKind::KeyNotFound,
                    round.to_string(),
                )
            })
    }

    fn set_round_created(&self, round: i64, value: RoundCreated) -> Result<(), StoreError> {
        let mut last_round = self.last_round.write().unwrap();
        self.round_created_cache.lock().unwrap().put(round, value);
        if round > *last_round {
            *last_round = round;
        }
        Ok(())
    }

    fn get_round_received(&self, round: i64) -> Result<RoundReceived, StoreError> {
        self.round_received_cache
            .lock()
            .unwrap()
            .get(&round)
            .cloned()
            .ok_or_else(|| {
                StoreError::new(
                    "RoundReceivedCache",
                    StoreErrorKind::KeyNotFound,
                    round.to_string(),
                )
            })
    }

    fn set_round_received(&self, round: i64, value: RoundReceived) -> Result<(), StoreError> {
        let mut last_round = self.last_round.write().unwrap();
        self.round_received_cache.lock().unwrap().put(round, value);
        if round > *last_round {
            *last_round = round;
        }
        Ok(())
    }

    fn last_round(&self) -> i64 {
        *self.last_round.read().unwrap()
    }

    fn round_clothos(&self, round: i64) -> Vec<EventHash> {
        match self.get_round_created(round) {
            Ok(created) => created.clothos(),
            Err(_) => Vec::new(),
        }
    }

    fn round_events(&self, round: i64) -> usize {
        self.get_round_created(round)
            .map(|created| created.event_count())
            .unwrap_or(0)
    }

    fn get_root(&self, participant: &str) -> Result<Root, StoreError> {
        self.roots_by_participant
            .load()
            .get(participant)
            .cloned()
            .ok_or_else(|| {
                StoreError::new("RootCache", StoreErrorKind::KeyNotFound, participant)
            })
    }

    fn get_block(&self, index: i64) -> Result<Block, StoreError> {
        self.block_cache
            .lock()
            .unwrap()
            .get(&index)
            .cloned()
            .ok_or_else(|| {
                StoreError::new("BlockCache", StoreErrorKind::KeyNotFound, index.to_string())
            })
    }

    fn set_block(&self, block: Block) -> Result<(), StoreError> {
        let mut last_block = self.last_block.write().unwrap();
        let index = block.index();
        self.block_cache.lock().unwrap().put(index, block);
        if index > *last_block {
            *last_block = index;
        }
        Ok(())
    }

    fn last_block_index(&self) -> i64 {
        *self.last_block.read().unwrap()
    }

    fn get_frame(&self, round: i64) -> Result<Frame, StoreError> {
        self.frame_cache
            .lock()
            .unwrap()
            .get(&round)
            .cloned()
            .ok_or_else(|| {
                StoreError::new("FrameCache", StoreErrorKind::KeyNotFound, round.to_string())
            })
    }

    fn set_frame(&self, frame: Frame) -> Result<(), StoreError> {
        self.frame_cache.lock().unwrap().put(frame.round(), frame);
        Ok(())
    }

    fn reset(&self, roots: HashMap<String, Root>) -> Result<(), StoreError> {
        debug!(
            participants = roots.len(),
            clear_derived = self.clear_derived_on_reset,
            "resetting store"
        );

        // Hold every mutation lock (in the documented order) so no reader
        // interleaves with a half-reset store.
        let mut last_round = self.last_round.write().unwrap();
        let mut last_block = self.last_block.write().unwrap();
        let mut event_cache = self.event_cache.lock().unwrap();
        let mut round_created_cache = self.round_created_cache.lock().unwrap();
        let mut round_received_cache = self.round_received_cache.lock().unwrap();
        let mut block_cache = self.block_cache.lock().unwrap();
        let mut frame_cache = self.frame_cache.lock().unwrap();
        let mut consensus = self.consensus_cache.write().unwrap();
        let mut participant_events = self.participant_events.write().unwrap();
        let mut last_consensus_events = self.last_consensus_events.lock().unwrap();

        self.roots_by_participant.store(Arc::new(roots));
        self.roots_by_self_parent.store(None);

        *event_cache = LruCache::new(self.cache_size);
        *round_created_cache = LruCache::new(self.cache_size);
        *round_received_cache = LruCache::new(self.cache_size);
        consensus.reset();
        participant_events.reset();

        if self.clear_derived_on_reset {
            *block_cache = LruCache::new(self.cache_size);
            *frame_cache = LruCache::new(self.cache_size);
            last_consensus_events.clear();
        }

        *last_round = -1;
        *last_block = -1;

        self.roots_by_self_parent().map(|_| ())
    }

    fn close(&self) -> Result<(), StoreError> {
        if let Some(subscription) = self.subscription.lock().unwrap().take() {
            self.participants.unsubscribe(subscription);
        }
        Ok(())
    }

    fn need_bootstrap(&self) -> bool {
        false
    }

    fn store_path(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poset_types::{RootEvent, ROOT_SELF_PARENT_INDEX};

    fn make_peers(keys: &[&str]) -> Arc<Peers> {
        Arc::new(Peers::with_peers(
            keys.iter()
                .enumerate()
                .map(|(i, key)| Peer::new(*key, format!("127.0.0.1:{}", 9000 + i)))
                .collect(),
        ))
    }

    fn make_store(peers: &Arc<Peers>, cache_size: usize) -> Arc<InmemStore> {
        InmemStore::new(peers.clone(), StoreConfig::with_cache_size(cache_size)).unwrap()
    }

    /// Build the next event of `creator`, chained off its last known head.
    fn chain_event(store: &InmemStore, creator: &str, index: i64) -> Event {
        let (parent, _) = store.last_event_from(creator).unwrap();
        Event::new(creator, index, parent, EventHash::ZERO, vec![])
    }

    #[test]
    fn test_event_round_trip() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);
        let p1_id = peers.by_pub_key("p1").unwrap().id;

        let event = chain_event(&store, "p1", 0);
        let hash = event.hash();
        store.set_event(event.clone()).unwrap();

        assert_eq!(store.get_event_block(&hash).unwrap(), event);
        assert_eq!(store.participant_event("p1", 0).unwrap(), hash);
        assert_eq!(store.last_event_from("p1").unwrap(), (hash, false));
        assert_eq!(store.known_events()[&p1_id], 0);
    }

    #[test]
    fn test_root_fallback_without_events() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);
        let p1_id = peers.by_pub_key("p1").unwrap().id;
        let root = store.get_root("p1").unwrap();

        assert_eq!(
            store.last_event_from("p1").unwrap(),
            (root.self_parent.hash, true)
        );
        assert_eq!(
            store.participant_event("p1", -1).unwrap(),
            root.self_parent.hash
        );
        assert_eq!(store.known_events()[&p1_id], -1);
    }

    #[test]
    fn test_unregistered_participant_has_no_root() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);

        let err = store.last_event_from("stranger").unwrap_err();
        assert!(err.is(StoreErrorKind::NoRoot));
        let err = store.last_consensus_event_from("stranger").unwrap_err();
        assert!(err.is(StoreErrorKind::NoRoot));
    }

    #[test]
    fn test_set_event_unknown_creator_rejected() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);

        let event = Event::new("stranger", 0, EventHash::ZERO, EventHash::ZERO, vec![]);
        let err = store.set_event(event).unwrap_err();
        assert!(err.is(StoreErrorKind::NoRoot));
    }

    #[test]
    fn test_duplicate_set_event_is_idempotent() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);

        let event = chain_event(&store, "p1", 0);
        store.set_event(event.clone()).unwrap();
        store.set_event(event).unwrap();

        assert_eq!(store.participant_events("p1", -1).unwrap().len(), 1);
    }

    #[test]
    fn test_set_event_rejects_skipped_index() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);

        store.set_event(chain_event(&store, "p1", 0)).unwrap();
        let err = store.set_event(chain_event(&store, "p1", 4)).unwrap_err();
        assert!(err.is(StoreErrorKind::SkippedIndex));
    }

    #[test]
    fn test_event_eviction_is_not_fatal() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 2);
        let p1_id = peers.by_pub_key("p1").unwrap().id;

        let mut hashes = Vec::new();
        for i in 0..3 {
            let event = chain_event(&store, "p1", i);
            hashes.push(event.hash());
            store.set_event(event).unwrap();
        }

        // The first event fell out of both the event LRU and the window,
        // but the participant head survives.
        let err = store.get_event_block(&hashes[0]).unwrap_err();
        assert!(err.is(StoreErrorKind::KeyNotFound));
        assert_eq!(
            store.participant_events("p1", -1).unwrap(),
            vec![hashes[1], hashes[2]]
        );
        assert_eq!(store.known_events()[&p1_id], 2);
    }

    #[test]
    fn test_consensus_count_survives_eviction() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 2);

        let mut hashes = Vec::new();
        for i in 0..3 {
            let event = chain_event(&store, "p1", i);
            hashes.push(event.hash());
            store.set_event(event.clone()).unwrap();
            store.add_consensus_event(&event).unwrap();
        }

        assert_eq!(store.consensus_events_count(), 3);
        assert_eq!(store.consensus_events(), vec![hashes[1], hashes[2]]);
    }

    #[test]
    fn test_add_consensus_event_tracks_creator() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);
        let root = store.get_root("p1").unwrap();

        assert_eq!(
            store.last_consensus_event_from("p1").unwrap(),
            (root.self_parent.hash, true)
        );

        let event = chain_event(&store, "p1", 0);
        store.set_event(event.clone()).unwrap();
        store.add_consensus_event(&event).unwrap();

        assert_eq!(
            store.last_consensus_event_from("p1").unwrap(),
            (event.hash(), false)
        );
    }

    #[test]
    fn test_last_round_tracks_max() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);
        assert_eq!(store.last_round(), -1);

        store.set_round_created(5, RoundCreated::new()).unwrap();
        store.set_round_received(3, RoundReceived::new()).unwrap();

        assert_eq!(store.last_round(), 5);
        assert!(store.get_round_created(5).is_ok());
        assert!(store.get_round_received(3).is_ok());
        let err = store.get_round_created(4).unwrap_err();
        assert!(err.is(StoreErrorKind::KeyNotFound));
    }

    #[test]
    fn test_round_probes_swallow_not_found() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);

        assert!(store.round_clothos(9).is_empty());
        assert_eq!(store.round_events(9), 0);

        let clotho = EventHash::from_bytes(b"clotho");
        let mut round = RoundCreated::new();
        round.add_event(clotho, true);
        round.add_event(EventHash::from_bytes(b"plain"), false);
        store.set_round_created(9, round).unwrap();

        assert_eq!(store.round_clothos(9), vec![clotho]);
        assert_eq!(store.round_events(9), 2);
    }

    #[test]
    fn test_block_round_trip() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);
        assert_eq!(store.last_block_index(), -1);

        let block = Block::new(2, 7, EventHash::from_bytes(b"frame"), vec![b"tx".to_vec()]);
        store.set_block(block.clone()).unwrap();
        assert_eq!(store.get_block(2).unwrap(), block);
        assert_eq!(store.last_block_index(), 2);

        // A lower index does not move the counter back.
        store
            .set_block(Block::new(1, 6, EventHash::ZERO, vec![]))
            .unwrap();
        assert_eq!(store.last_block_index(), 2);
    }

    #[test]
    fn test_frame_round_trip() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);

        let frame = Frame::new(4, HashMap::new(), vec![]);
        store.set_frame(frame.clone()).unwrap();
        assert_eq!(store.get_frame(4).unwrap(), frame);
        assert!(store.get_frame(5).unwrap_err().is(StoreErrorKind::KeyNotFound));
    }

    #[test]
    fn test_dynamic_peer_join() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);

        let event = chain_event(&store, "p1", 0);
        let p1_hash = event.hash();
        store.set_event(event).unwrap();

        let p2 = Peer::new("p2", "127.0.0.1:9100");
        let p2_id = p2.id;
        peers.add(p2);

        assert_eq!(store.repertoire_by_id()[&p2_id].pub_key_hex, "p2");
        assert_eq!(store.repertoire_by_pub_key()["p2"].id, p2_id);

        let root = store.get_root("p2").unwrap();
        assert_eq!(root.self_parent.index, ROOT_SELF_PARENT_INDEX);
        assert_eq!(store.roots_by_self_parent().unwrap().len(), 2);

        // Prior history for p1 survived the window rebuild.
        assert_eq!(store.participant_events("p1", -1).unwrap(), vec![p1_hash]);
        assert_eq!(store.known_events()[&p2_id], -1);
    }

    #[test]
    fn test_reset() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);

        let event = chain_event(&store, "p1", 0);
        let prior_hash = event.hash();
        store.set_event(event.clone()).unwrap();
        store.add_consensus_event(&event).unwrap();
        store.set_round_created(5, RoundCreated::new()).unwrap();
        store
            .set_block(Block::new(2, 5, EventHash::ZERO, vec![]))
            .unwrap();

        let new_root = Root {
            next_round: 2,
            self_parent: RootEvent {
                hash: EventHash::from_bytes(b"anchor"),
                index: 9,
            },
        };
        let mut roots = HashMap::new();
        roots.insert("p1".to_string(), new_root.clone());
        store.reset(roots).unwrap();

        assert_eq!(store.last_round(), -1);
        assert_eq!(store.last_block_index(), -1);
        assert_eq!(store.consensus_events_count(), 0);
        assert!(store.consensus_events().is_empty());
        assert_eq!(store.get_root("p1").unwrap(), new_root);
        assert!(store
            .get_event_block(&prior_hash)
            .unwrap_err()
            .is(StoreErrorKind::KeyNotFound));
        assert!(store
            .get_block(2)
            .unwrap_err()
            .is(StoreErrorKind::KeyNotFound));

        let by_self_parent = store.roots_by_self_parent().unwrap();
        assert_eq!(by_self_parent.len(), 1);
        assert_eq!(by_self_parent[&new_root.self_parent.hash], new_root);

        // Heads now come from the supplied roots.
        let p1_id = peers.by_pub_key("p1").unwrap().id;
        assert_eq!(store.known_events()[&p1_id], 9);
        assert_eq!(
            store.last_event_from("p1").unwrap(),
            (new_root.self_parent.hash, true)
        );
    }

    #[test]
    fn test_reset_can_retain_derived_state() {
        let peers = make_peers(&["p1"]);
        let config = StoreConfig {
            cache_size: 100,
            clear_derived_on_reset: false,
        };
        let store = InmemStore::new(peers.clone(), config).unwrap();

        let event = chain_event(&store, "p1", 0);
        store.set_event(event.clone()).unwrap();
        store.add_consensus_event(&event).unwrap();
        store
            .set_block(Block::new(0, 1, EventHash::ZERO, vec![]))
            .unwrap();
        store.set_frame(Frame::new(1, HashMap::new(), vec![])).unwrap();

        let mut roots = HashMap::new();
        roots.insert("p1".to_string(), Root::base(peers.by_pub_key("p1").unwrap().id));
        store.reset(roots).unwrap();

        // Blocks, frames, and the last-consensus map survive; counters and
        // the consensus window do not.
        assert!(store.get_block(0).is_ok());
        assert!(store.get_frame(1).is_ok());
        assert_eq!(
            store.last_consensus_event_from("p1").unwrap(),
            (event.hash(), false)
        );
        assert_eq!(store.consensus_events_count(), 0);
        assert_eq!(store.last_block_index(), -1);
    }

    #[test]
    fn test_close_drops_subscription() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);

        store.close().unwrap();
        peers.add(Peer::new("p2", "127.0.0.1:9100"));

        let err = store.get_root("p2").unwrap_err();
        assert!(err.is(StoreErrorKind::KeyNotFound));
        assert!(!store.repertoire_by_pub_key().contains_key("p2"));
    }

    #[test]
    fn test_zero_cache_size_rejected() {
        let peers = make_peers(&["p1"]);
        let err = InmemStore::new(peers, StoreConfig::with_cache_size(0)).unwrap_err();
        assert_eq!(err, ConfigError::ZeroCacheSize);
    }

    #[test]
    fn test_in_memory_never_bootstraps() {
        let peers = make_peers(&["p1"]);
        let store = make_store(&peers, 100);

        assert!(!store.need_bootstrap());
        assert_eq!(store.store_path(), "");
        assert_eq!(store.cache_size(), 100);
        assert_eq!(store.participants().len(), 1);
    }
}
