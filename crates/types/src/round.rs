//! Round aggregates produced by the consensus algorithm.

use crate::EventHash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-event flags within a created round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundEvent {
    /// Whether the event is a clotho (candidate famous witness).
    pub clotho: bool,
    /// Fame decision, once voting settles.
    pub famous: Option<bool>,
}

/// The events assigned to a created round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundCreated {
    events: HashMap<EventHash, RoundEvent>,
}

impl RoundCreated {
    /// Create an empty round.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event in this round. A hash already recorded keeps its
    /// existing flags.
    pub fn add_event(&mut self, hash: EventHash, clotho: bool) {
        self.events.entry(hash).or_insert(RoundEvent {
            clotho,
            famous: None,
        });
    }

    /// Settle the fame vote for a recorded event. Returns whether the hash
    /// was known to this round.
    pub fn set_fame(&mut self, hash: &EventHash, famous: bool) -> bool {
        match self.events.get_mut(hash) {
            Some(event) => {
                event.famous = Some(famous);
                true
            }
            None => false,
        }
    }

    /// Hashes of the round's clothos, in a stable order.
    pub fn clothos(&self) -> Vec<EventHash> {
        let mut res: Vec<EventHash> = self
            .events
            .iter()
            .filter(|(_, e)| e.clotho)
            .map(|(h, _)| *h)
            .collect();
        res.sort();
        res
    }

    /// Number of events assigned to this round.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// All recorded events and their flags.
    pub fn events(&self) -> &HashMap<EventHash, RoundEvent> {
        &self.events
    }
}

/// Consensus-ordering results received at a round: the event hashes
/// finalized there, in consensus order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundReceived {
    /// Finalized event hashes, in consensus order.
    pub events: Vec<EventHash>,
}

impl RoundReceived {
    /// Create an empty received round.
    pub fn new() -> Self {
        Self::default()
    }
}
