//! Error types for entity metadata operations.

use thiserror::Error;

/// Errors raised while deriving or reading entity metadata.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetaError {
    /// The descriptor does not name its entity.
    #[error("entity descriptor has an empty name")]
    EmptyEntityName,

    /// A declared field has no name.
    #[error("entity {entity} declares a field with an empty name")]
    EmptyFieldName { entity: &'static str },

    /// Two declared fields share a name.
    #[error("entity {entity} declares field {field} more than once")]
    DuplicateField {
        entity: &'static str,
        field: &'static str,
    },

    /// More than one field carries the identity marker.
    #[error("entity {entity} marks more than one identity field: {fields:?}")]
    MultipleIdentityFields {
        entity: &'static str,
        fields: Vec<&'static str>,
    },

    /// The entity declares no identity field, so no id can be extracted.
    #[error("entity {entity} has no identity field")]
    IdentityNotFound { entity: &'static str },

    /// A cached entry could not be read back as the requested type.
    #[error("cached metadata for {entity} has an unexpected type")]
    CacheTypeMismatch { entity: &'static str },
}

/// Convenience type alias for metadata operations.
pub type MetaResult<T> = std::result::Result<T, MetaError>;
