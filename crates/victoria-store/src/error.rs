/// Errors from document store and query operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store rejected an empty key.
    #[error("cannot store document with an empty key")]
    EmptyKey,

    /// The query could not be executed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),

    /// The backend is unreachable or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
