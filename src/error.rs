//! Error types for trustgate.

/// Failure of the external policy/tool-config store.
///
/// Store failures propagate to the caller as hard errors. The caller is
/// expected to fail closed: treat the tool call as denied and the data as
/// untrusted, never fall back to permissive behavior.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Policy store unavailable: {0}")]
    Unavailable(String),

    #[error("Policy store query failed: {0}")]
    Query(String),
}

/// A malformed attribute path in a policy.
///
/// Resolved locally: the owning policy evaluates as non-matching and the
/// occurrence is logged. Never surfaced from a classification call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("attribute path is empty")]
    Empty,

    #[error("attribute path '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("attribute path '{0}' has more than one wildcard segment")]
    MultipleWildcards(String),

    #[error("attribute path '{0}' has a wildcard with no item sub-path")]
    TrailingWildcard(String),
}
