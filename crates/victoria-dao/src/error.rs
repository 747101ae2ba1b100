use thiserror::Error;
use victoria_meta::MetaError;
use victoria_store::StoreError;

/// Errors surfaced by DAO and list proxy operations.
#[derive(Debug, Error)]
pub enum DaoError {
    /// The entity's declarations could not be turned into metadata.
    #[error("metadata error: {0}")]
    Metadata(MetaError),

    /// The entity declares no identity field, so it has no storage key.
    #[error("entity {entity} has no identity field")]
    IdentityNotFound { entity: &'static str },

    /// The store or query engine failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// An element or list could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A list proxy index was outside the backing sequence.
    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The runtime could not drive or deliver the operation.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Configuration could not be parsed or is invalid.
    #[error("config error: {0}")]
    Config(String),
}

impl From<MetaError> for DaoError {
    fn from(err: MetaError) -> Self {
        match err {
            MetaError::IdentityNotFound { entity } => DaoError::IdentityNotFound { entity },
            other => DaoError::Metadata(other),
        }
    }
}

impl From<serde_json::Error> for DaoError {
    fn from(err: serde_json::Error) -> Self {
        DaoError::Serialization(err.to_string())
    }
}

/// Result alias for DAO operations.
pub type DaoResult<T> = Result<T, DaoError>;

/// A lifecycle watcher hook failed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct WatcherError(pub String);

impl WatcherError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result alias for lifecycle watcher hooks.
pub type WatcherResult = Result<(), WatcherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_not_found_is_promoted() {
        let err: DaoError = MetaError::IdentityNotFound { entity: "Note" }.into();
        assert!(matches!(err, DaoError::IdentityNotFound { entity: "Note" }));

        let err: DaoError = MetaError::EmptyEntityName.into();
        assert!(matches!(err, DaoError::Metadata(MetaError::EmptyEntityName)));
    }

    #[test]
    fn storage_error_keeps_cause() {
        let err: DaoError = StoreError::Unavailable("node down".into()).into();
        let source = std::error::Error::source(&err).expect("cause attached");
        assert_eq!(source.to_string(), "store unavailable: node down");
    }
}
