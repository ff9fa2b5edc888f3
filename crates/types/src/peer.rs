//! Participant identity and the authoritative peer set.

use crate::EventHash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Numeric participant identifier, derived from the participant's public key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct PeerId(pub u64);

impl PeerId {
    /// Derive the numeric id from a public key string.
    pub fn from_pub_key(pub_key_hex: &str) -> Self {
        Self(EventHash::from_bytes(pub_key_hex.as_bytes()).as_u64())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A consensus participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Numeric identifier, derived from `pub_key_hex`.
    pub id: PeerId,
    /// Hex-encoded public key; the canonical participant key.
    pub pub_key_hex: String,
    /// Network address, opaque to consensus.
    pub net_addr: String,
}

impl Peer {
    /// Create a peer, deriving its numeric id from the public key.
    pub fn new(pub_key_hex: impl Into<String>, net_addr: impl Into<String>) -> Self {
        let pub_key_hex = pub_key_hex.into();
        Self {
            id: PeerId::from_pub_key(&pub_key_hex),
            pub_key_hex,
            net_addr: net_addr.into(),
        }
    }
}

/// Handle returned by [`Peers::on_new_peer`]; pass it back to
/// [`Peers::unsubscribe`] to stop receiving notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type NewPeerFn = Arc<dyn Fn(&Peer) + Send + Sync>;

#[derive(Default)]
struct PeerMaps {
    by_pub_key: HashMap<String, Arc<Peer>>,
    by_id: HashMap<PeerId, Arc<Peer>>,
}

/// The authoritative participant set.
///
/// The pubkey and id lookups stay mirrored because both maps are updated
/// under the same write lock. Subscribers registered through
/// [`on_new_peer`](Peers::on_new_peer) run synchronously inside
/// [`add`](Peers::add), after the maps have been updated; callbacks must not
/// mutate the peer set.
#[derive(Default)]
pub struct Peers {
    inner: RwLock<PeerMaps>,
    listeners: Mutex<Vec<(SubscriptionId, NewPeerFn)>>,
    next_subscription: AtomicU64,
}

impl Peers {
    /// Create an empty peer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a peer set from an initial membership.
    pub fn with_peers(peers: Vec<Peer>) -> Self {
        let set = Self::new();
        for peer in peers {
            set.add(peer);
        }
        set
    }

    /// Add a peer and notify subscribers.
    ///
    /// Re-adding a peer with a known public key replaces the stored record
    /// and still notifies subscribers.
    pub fn add(&self, peer: Peer) {
        let peer = Arc::new(peer);
        {
            let mut maps = self.inner.write().unwrap();
            maps.by_pub_key.insert(peer.pub_key_hex.clone(), peer.clone());
            maps.by_id.insert(peer.id, peer.clone());
        }

        // Snapshot the callbacks so a subscriber can (un)subscribe reentrantly.
        let listeners: Vec<NewPeerFn> = self
            .listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for cb in listeners {
            cb(&peer);
        }
    }

    /// Look up a peer by public key.
    pub fn by_pub_key(&self, pub_key_hex: &str) -> Option<Arc<Peer>> {
        self.inner.read().unwrap().by_pub_key.get(pub_key_hex).cloned()
    }

    /// Look up a peer by numeric id.
    pub fn by_id(&self, id: PeerId) -> Option<Arc<Peer>> {
        self.inner.read().unwrap().by_id.get(&id).cloned()
    }

    /// All current peers, in no particular order.
    pub fn all(&self) -> Vec<Arc<Peer>> {
        self.inner.read().unwrap().by_id.values().cloned().collect()
    }

    /// Numeric ids of all current peers.
    pub fn ids(&self) -> Vec<PeerId> {
        self.inner.read().unwrap().by_id.keys().copied().collect()
    }

    /// Number of peers in the set.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().by_id.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to peer additions.
    ///
    /// The callback runs synchronously on the adding thread, after the new
    /// peer is visible through the lookup methods.
    pub fn on_new_peer(
        &self,
        callback: impl Fn(&Peer) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscription. Returns whether it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap();
        let before = listeners.len();
        listeners.retain(|(sub, _)| *sub != id);
        listeners.len() != before
    }
}

impl fmt::Debug for Peers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let maps = self.inner.read().unwrap();
        f.debug_struct("Peers")
            .field("len", &maps.by_id.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_mirrored_lookups() {
        let peers = Peers::new();
        let alice = Peer::new("alice-pk", "127.0.0.1:9000");
        let id = alice.id;
        peers.add(alice);

        assert_eq!(peers.len(), 1);
        assert_eq!(peers.by_pub_key("alice-pk").unwrap().id, id);
        assert_eq!(peers.by_id(id).unwrap().pub_key_hex, "alice-pk");
    }

    #[test]
    fn test_peer_id_deterministic() {
        assert_eq!(PeerId::from_pub_key("same-key"), PeerId::from_pub_key("same-key"));
        assert_ne!(PeerId::from_pub_key("key-a"), PeerId::from_pub_key("key-b"));
    }

    #[test]
    fn test_subscription_fires_after_insert() {
        let peers = Arc::new(Peers::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_cb = seen.clone();
        let peers_cb = peers.clone();
        peers.on_new_peer(move |peer| {
            // The new peer is already visible to lookups.
            assert!(peers_cb.by_pub_key(&peer.pub_key_hex).is_some());
            seen_cb.fetch_add(1, Ordering::SeqCst);
        });

        peers.add(Peer::new("bob-pk", "127.0.0.1:9001"));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let peers = Peers::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_cb = seen.clone();
        let sub = peers.on_new_peer(move |_| {
            seen_cb.fetch_add(1, Ordering::SeqCst);
        });

        peers.add(Peer::new("p1", "addr1"));
        assert!(peers.unsubscribe(sub));
        peers.add(Peer::new("p2", "addr2"));

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(!peers.unsubscribe(sub));
    }
}
