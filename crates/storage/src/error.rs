//! Structured store errors.

use std::fmt;

/// Classification of store errors.
///
/// Callers branch on the kind rather than the message: eviction shows up as
/// `KeyNotFound` and is not a consensus failure, while `TooLow` and
/// `SkippedIndex` indicate the caller broke the dense-index contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Requested hash/index/participant has no entry and no root fallback
    /// applies.
    KeyNotFound,
    /// A root was needed for a participant the store never registered.
    NoRoot,
    /// A per-participant sequence was queried for its last element and none
    /// exists.
    Empty,
    /// Requested or written index lies below the retained window.
    TooLow,
    /// An index write skipped the next expected position.
    SkippedIndex,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoreErrorKind::KeyNotFound => "not found",
            StoreErrorKind::NoRoot => "no root",
            StoreErrorKind::Empty => "empty",
            StoreErrorKind::TooLow => "too low",
            StoreErrorKind::SkippedIndex => "skipped index",
        };
        write!(f, "{s}")
    }
}

/// Error returned by store operations.
///
/// Carries the internal collection that produced it and the offending key,
/// so callers can test the kind and still report a useful failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{namespace}: {key} {kind}")]
pub struct StoreError {
    namespace: &'static str,
    kind: StoreErrorKind,
    key: String,
}

impl StoreError {
    /// Create an error for `key` in the collection named `namespace`.
    pub fn new(namespace: &'static str, kind: StoreErrorKind, key: impl Into<String>) -> Self {
        Self {
            namespace,
            kind,
            key: key.into(),
        }
    }

    /// The error's classification.
    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    /// Test whether this error is of the given kind.
    pub fn is(&self, kind: StoreErrorKind) -> bool {
        self.kind == kind
    }

    /// The stringified key the operation failed on.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Configuration errors surfaced at construction time.
///
/// A store that cannot build its caches is a misconfiguration, not a runtime
/// condition; constructors return this instead of proceeding degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Cache capacity must be a positive number of entries.
    #[error("cache size must be positive")]
    ZeroCacheSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_predicate() {
        let err = StoreError::new("EventCache", StoreErrorKind::KeyNotFound, "abc123");
        assert!(err.is(StoreErrorKind::KeyNotFound));
        assert!(!err.is(StoreErrorKind::Empty));
        assert_eq!(err.kind(), StoreErrorKind::KeyNotFound);
        assert_eq!(err.key(), "abc123");
    }

    #[test]
    fn test_display_names_collection_and_key() {
        let err = StoreError::new("RoundCreatedCache", StoreErrorKind::KeyNotFound, "5");
        assert_eq!(err.to_string(), "RoundCreatedCache: 5 not found");
    }
}
