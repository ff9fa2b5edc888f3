//! Per-participant base anchors.

use crate::{EventHash, PeerId};
use serde::{Deserialize, Serialize};

/// Index of a base root's self-parent: one before the participant's first
/// real event.
pub const ROOT_SELF_PARENT_INDEX: i64 = -1;

/// The self-parent descriptor of a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootEvent {
    /// Hash standing in for the participant's last event before the root.
    pub hash: EventHash,
    /// Index of that event; −1 for a fresh base root.
    pub index: i64,
}

/// A per-participant anchor standing in for history before the store began.
///
/// Roots answer queries about participants that have not produced any event
/// yet, and anchor history truncation after a reset. A synthetic base root is
/// constructed whenever a participant is first registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    /// First round this participant can create events in.
    pub next_round: i64,
    /// Descriptor of the event preceding the participant's first real event.
    pub self_parent: RootEvent,
}

impl Root {
    /// Synthesize the base root for a newly registered participant.
    ///
    /// The self-parent hash is derived from the peer id under a domain tag,
    /// so distinct participants get distinct, reproducible anchors.
    pub fn base(id: PeerId) -> Self {
        Self {
            next_round: 0,
            self_parent: RootEvent {
                hash: EventHash::from_parts(&[b"root", &id.0.to_le_bytes()]),
                index: ROOT_SELF_PARENT_INDEX,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_root_sentinel_index() {
        let root = Root::base(PeerId(42));
        assert_eq!(root.self_parent.index, -1);
        assert_eq!(root.next_round, 0);
        assert!(!root.self_parent.hash.is_zero());
    }

    #[test]
    fn test_base_root_per_id() {
        let a = Root::base(PeerId(1));
        let b = Root::base(PeerId(2));
        assert_ne!(a.self_parent.hash, b.self_parent.hash);
        assert_eq!(a, Root::base(PeerId(1)));
    }
}
