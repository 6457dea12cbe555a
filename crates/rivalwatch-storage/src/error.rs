/// Errors that can occur within the storage layer.
///
/// # Examples
///
/// ```rust
/// use rivalwatch_storage::error::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "company",
///     id: "42".to_string(),
/// };
/// assert!(err.to_string().contains("company"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required record was not found in the database.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// The request would violate a schema invariant (self-referencing
    /// competitor, duplicate name, ...).
    #[error("Storage: invalid {entity}: {reason}")]
    Invalid {
        entity: &'static str,
        reason: String,
    },

    /// A column held a value the domain types cannot represent.
    #[error("Storage: unexpected value in column '{column}': {value}")]
    UnexpectedValue { column: &'static str, value: String },

    #[error("Storage: database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Storage: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage: I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
