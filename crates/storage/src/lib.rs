//! Storage contract and shared utilities for the poset consensus store.
//!
//! This crate defines the storage abstraction consensus engines use to keep
//! every artifact they produce and consult: events, per-participant indices,
//! roots, consensus-ordered events, rounds, blocks, and frames.
//!
//! # Design
//!
//! The consensus algorithm never owns storage directly; a node wires a
//! backend implementing [`PosetStore`] into it. Backends live in sibling
//! crates — the in-memory one in `poset-storage-memory`; a persistent one
//! would implement the same trait.
//!
//! This crate also carries what every backend needs:
//!
//! - [`StoreError`] — the structured error taxonomy of the contract
//! - [`RollingIndex`] — the bounded window with a monotone total count
//! - [`StoreConfig`] — cache capacity and reset policy

#![warn(missing_docs)]

mod config;
mod error;
mod rolling;
mod store;

pub use config::{StoreConfig, DEFAULT_CACHE_SIZE};
pub use error::{ConfigError, StoreError, StoreErrorKind};
pub use rolling::RollingIndex;
pub use store::PosetStore;
