//! Per-round consensus snapshots.

use crate::{Event, EventHash, Root};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A snapshot of consensus state associated with a round: the roots in
/// force and the events assigned so far.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    round: i64,
    roots: HashMap<String, Root>,
    events: Vec<Event>,
}

impl Frame {
    /// Create a frame for `round`.
    pub fn new(round: i64, roots: HashMap<String, Root>, events: Vec<Event>) -> Self {
        Self {
            round,
            roots,
            events,
        }
    }

    /// The round this frame corresponds to.
    pub fn round(&self) -> i64 {
        self.round
    }

    /// Roots in force at this frame, keyed by participant public key.
    pub fn roots(&self) -> &HashMap<String, Root> {
        &self.roots
    }

    /// Events captured by this frame, in assignment order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Deterministic content hash over the round, roots (in key order), and
    /// event hashes.
    pub fn hash(&self) -> EventHash {
        let round_bytes = self.round.to_be_bytes();

        let mut keys: Vec<&String> = self.roots.keys().collect();
        keys.sort();

        let mut parts: Vec<&[u8]> =
            Vec::with_capacity(1 + 2 * keys.len() + self.events.len());
        parts.push(&round_bytes);

        let root_hashes: Vec<[u8; 32]> = keys
            .iter()
            .map(|k| self.roots[*k].self_parent.hash.to_bytes())
            .collect();
        for (key, root_hash) in keys.iter().zip(&root_hashes) {
            parts.push(key.as_bytes());
            parts.push(root_hash);
        }

        let event_hashes: Vec<[u8; 32]> =
            self.events.iter().map(|e| e.hash().to_bytes()).collect();
        for event_hash in &event_hashes {
            parts.push(event_hash);
        }

        EventHash::from_parts(&parts)
    }
}
