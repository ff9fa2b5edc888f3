//! Foundation types for the poset consensus store.
//!
//! This crate provides the data model shared by every storage backend:
//!
//! - **Identifiers**: [`EventHash`], [`PeerId`]
//! - **DAG vertices**: [`Event`]
//! - **Participants**: [`Peer`], [`Peers`] (with new-peer subscriptions)
//! - **Consensus artifacts**: [`Root`], [`RoundCreated`], [`RoundReceived`],
//!   [`Block`], [`Frame`]
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend
//! on any other workspace crates, making it the foundation layer. All types
//! are opaque payloads to the store except for the small accessor surface the
//! store contract names.

mod block;
mod event;
mod frame;
mod hash;
mod peer;
mod root;
mod round;

pub use block::Block;
pub use event::Event;
pub use frame::Frame;
pub use hash::{EventHash, HexError};
pub use peer::{Peer, PeerId, Peers, SubscriptionId};
pub use root::{Root, RootEvent, ROOT_SELF_PARENT_INDEX};
pub use round::{RoundCreated, RoundEvent, RoundReceived};
