//! Error type for the storage layer.

/// Errors that can escape the store.
///
/// Note what is *not* here: a "not found" variant. Absence is part of
/// the normal result shape (`Option`/empty `Vec`), so only genuine
/// failures become errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A statement failed in SQLite (constraint violation, I/O, ...).
    /// Propagated verbatim from the driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A state/settings blob could not be encoded or decoded.
    /// Decoding failures mean a row was written by something that is
    /// not this store.
    #[error("state blob encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}
