//! Unified error type for the Roshambo facade.

use roshambo_engine::EngineError;
use roshambo_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `roshambo` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RoshamboError {
    /// A storage-level error (connection, schema, blob encoding).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An engine-level error (state conflicts, invalid tokens).
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_store_error() {
        let err: StoreError = serde_json::from_str::<i64>("not json")
            .unwrap_err()
            .into();
        let top: RoshamboError = err.into();
        assert!(matches!(top, RoshamboError::Store(_)));
    }

    #[test]
    fn test_from_engine_error() {
        let top: RoshamboError = EngineError::RoomNotReady.into();
        assert!(matches!(top, RoshamboError::Engine(_)));
        assert!(top.to_string().contains("not ready"));
    }
}
