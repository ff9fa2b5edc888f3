//! DAG vertices.

use crate::EventHash;
use serde::{Deserialize, Serialize};

/// A vertex in the consensus DAG.
///
/// Events are immutable once constructed: the content hash is computed from
/// every other field at construction time and never changes. The store owns
/// the event after insertion; the payload is opaque to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    creator: String,
    index: i64,
    self_parent: EventHash,
    other_parent: EventHash,
    transactions: Vec<Vec<u8>>,
    hash: EventHash,
}

impl Event {
    /// Create a new event, computing its content hash.
    pub fn new(
        creator: impl Into<String>,
        index: i64,
        self_parent: EventHash,
        other_parent: EventHash,
        transactions: Vec<Vec<u8>>,
    ) -> Self {
        let creator = creator.into();
        let index_bytes = index.to_be_bytes();

        let mut parts: Vec<&[u8]> = Vec::with_capacity(4 + transactions.len());
        parts.push(creator.as_bytes());
        parts.push(&index_bytes);
        parts.push(self_parent.as_bytes());
        parts.push(other_parent.as_bytes());
        for tx in &transactions {
            parts.push(tx);
        }
        let hash = EventHash::from_parts(&parts);

        Self {
            creator,
            index,
            self_parent,
            other_parent,
            transactions,
            hash,
        }
    }

    /// Content hash of this event.
    pub fn hash(&self) -> EventHash {
        self.hash
    }

    /// Public key of the participant that created this event.
    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// Sequence number of this event within its creator's history.
    pub fn index(&self) -> i64 {
        self.index
    }

    /// Hash of the creator's previous event.
    pub fn self_parent(&self) -> EventHash {
        self.self_parent
    }

    /// Hash of the other parent, `EventHash::ZERO` if none.
    pub fn other_parent(&self) -> EventHash {
        self.other_parent
    }

    /// Opaque transaction payloads carried by this event.
    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.transactions
    }
}
