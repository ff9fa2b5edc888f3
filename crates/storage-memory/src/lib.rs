//! In-memory backend for the poset consensus store.
//!
//! [`InmemStore`] implements the full
//! [`PosetStore`](poset_storage::PosetStore) contract with bounded memory:
//! every collection is an LRU map or a rolling window sized by
//! [`StoreConfig::cache_size`](poset_storage::StoreConfig). Nothing survives
//! the process; [`InmemStore::need_bootstrap`] is always `false`.

mod participant_events;
mod store;

pub use participant_events::ParticipantEventsCache;
pub use store::InmemStore;
