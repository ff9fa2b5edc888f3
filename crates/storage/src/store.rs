//! The consensus store contract.
//!
//! Abstracts event, round, block, frame, and root storage behind one trait.
//! All methods take `&self` — implementations use interior mutability.

use crate::StoreError;
use poset_types::{
    Block, Event, EventHash, Frame, Peer, PeerId, Peers, Root, RoundCreated, RoundReceived,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Authoritative repository of every artifact the consensus algorithm
/// produces and consults.
///
/// The store is the synchronization substrate between the consensus
/// algorithm and the rest of the node: it offers indexed retrieval by hash,
/// participant+sequence, round number, and block index, bounds its memory
/// through per-collection eviction, and keeps the counters downstream
/// observers rely on monotone even as old entries are evicted.
///
/// Eviction is not a consensus error. A `KeyNotFound` from an evicted entry
/// means the caller must re-request the artifact from the network or fall
/// back to the participant indices and roots.
pub trait PosetStore: Send + Sync {
    /// Capacity of each bounded collection, in entries.
    fn cache_size(&self) -> usize;

    /// The authoritative peer set backing this store.
    fn participants(&self) -> Arc<Peers>;

    /// Mirror view of registered participants, keyed by public key.
    fn repertoire_by_pub_key(&self) -> Arc<HashMap<String, Arc<Peer>>>;

    /// Mirror view of registered participants, keyed by numeric id.
    fn repertoire_by_id(&self) -> Arc<HashMap<PeerId, Arc<Peer>>>;

    /// Roots keyed by their self-parent hash.
    ///
    /// Derived lazily from the per-participant roots and cached until a new
    /// peer registration or a reset invalidates it.
    fn roots_by_self_parent(&self) -> Result<Arc<HashMap<EventHash, Root>>, StoreError>;

    /// Get an event by hash. `KeyNotFound` covers both never-inserted and
    /// evicted events.
    fn get_event_block(&self, hash: &EventHash) -> Result<Event, StoreError>;

    /// Insert an event.
    ///
    /// Idempotent: a hash already present only refreshes the cached payload.
    /// A first-seen hash is also appended to the creator's participant index
    /// at `event.index()`, which must be the creator's next expected index.
    fn set_event(&self, event: Event) -> Result<(), StoreError>;

    /// Hashes created by `participant` with index strictly greater than
    /// `skip`. A `skip` below the retained window yields the whole window.
    fn participant_events(&self, participant: &str, skip: i64)
        -> Result<Vec<EventHash>, StoreError>;

    /// Hash of `participant`'s event at `index`, falling back to the
    /// participant's root when the index matches its self-parent.
    fn participant_event(&self, participant: &str, index: i64) -> Result<EventHash, StoreError>;

    /// Highest-indexed known event of `participant`.
    ///
    /// Returns `(hash, is_root)`: when the participant has no retained
    /// events, the root's self-parent hash with `is_root = true`. `NoRoot`
    /// if the participant was never registered.
    fn last_event_from(&self, participant: &str) -> Result<(EventHash, bool), StoreError>;

    /// Last consensus-ordered event of `participant`, with the same root
    /// fallback as [`last_event_from`](Self::last_event_from).
    fn last_consensus_event_from(&self, participant: &str)
        -> Result<(EventHash, bool), StoreError>;

    /// Highest known event index per participant id.
    ///
    /// Participants with no events seen report their root's self-parent
    /// index instead of the −1 sentinel.
    fn known_events(&self) -> HashMap<PeerId, i64>;

    /// The currently retained window of consensus-ordered hashes (may be
    /// shorter than the total count).
    fn consensus_events(&self) -> Vec<EventHash>;

    /// Total number of events ever consensus-ordered, including evicted
    /// ones. Monotone between resets.
    fn consensus_events_count(&self) -> i64;

    /// Append an event to the consensus order and record it as its
    /// creator's last consensus event.
    fn add_consensus_event(&self, event: &Event) -> Result<(), StoreError>;

    /// Get a created round by round number.
    fn get_round_created(&self, round: i64) -> Result<RoundCreated, StoreError>;

    /// Store a created round, advancing [`last_round`](Self::last_round).
    fn set_round_created(&self, round: i64, value: RoundCreated) -> Result<(), StoreError>;

    /// Get a received round by round number.
    fn get_round_received(&self, round: i64) -> Result<RoundReceived, StoreError>;

    /// Store a received round, advancing [`last_round`](Self::last_round).
    fn set_round_received(&self, round: i64, value: RoundReceived) -> Result<(), StoreError>;

    /// Highest round number ever stored, −1 when none. Evicted rounds still
    /// count.
    fn last_round(&self) -> i64;

    /// Clotho hashes of a created round; empty when the round is unknown
    /// (consensus uses this as an existence probe, never an error).
    fn round_clothos(&self, round: i64) -> Vec<EventHash>;

    /// Number of events in a created round; 0 when the round is unknown.
    fn round_events(&self, round: i64) -> usize;

    /// Root of `participant`.
    fn get_root(&self, participant: &str) -> Result<Root, StoreError>;

    /// Get a block by index.
    fn get_block(&self, index: i64) -> Result<Block, StoreError>;

    /// Store a block, advancing [`last_block_index`](Self::last_block_index).
    fn set_block(&self, block: Block) -> Result<(), StoreError>;

    /// Highest block index ever stored, −1 when none.
    fn last_block_index(&self) -> i64;

    /// Get a frame by the round it corresponds to.
    fn get_frame(&self, round: i64) -> Result<Frame, StoreError>;

    /// Store a frame under its round.
    fn set_frame(&self, frame: Frame) -> Result<(), StoreError>;

    /// Re-establish the store from an externally supplied root set.
    ///
    /// Replaces the roots, recreates the bounded collections, rewinds the
    /// consensus count and the `last_round`/`last_block` counters to −1, and
    /// rebuilds the reverse root-index. Appears atomic to concurrent
    /// operations.
    fn reset(&self, roots: HashMap<String, Root>) -> Result<(), StoreError>;

    /// Release resources held by the store.
    fn close(&self) -> Result<(), StoreError>;

    /// Whether the store was loaded from an existing database and the node
    /// should bootstrap from it.
    fn need_bootstrap(&self) -> bool;

    /// Filesystem path backing the store; empty for in-memory backends.
    fn store_path(&self) -> String;
}
