//! Committed blocks.

use crate::EventHash;
use serde::{Deserialize, Serialize};

/// A committed, totally-ordered batch of event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    index: i64,
    round_received: i64,
    frame_hash: EventHash,
    transactions: Vec<Vec<u8>>,
}

impl Block {
    /// Create a block.
    pub fn new(
        index: i64,
        round_received: i64,
        frame_hash: EventHash,
        transactions: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            index,
            round_received,
            frame_hash,
            transactions,
        }
    }

    /// Position of this block in the committed chain.
    pub fn index(&self) -> i64 {
        self.index
    }

    /// Round at which this block's events reached consensus.
    pub fn round_received(&self) -> i64 {
        self.round_received
    }

    /// Hash of the frame this block was built from.
    pub fn frame_hash(&self) -> EventHash {
        self.frame_hash
    }

    /// The block's ordered transaction payloads.
    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_accessors() {
        let frame_hash = EventHash::from_bytes(b"frame");
        let block = Block::new(3, 7, frame_hash, vec![b"tx1".to_vec(), b"tx2".to_vec()]);

        assert_eq!(block.index(), 3);
        assert_eq!(block.round_received(), 7);
        assert_eq!(block.frame_hash(), frame_hash);
        assert_eq!(block.transactions().len(), 2);
    }
}
