//! Error types for the engine layer.

use roshambo_store::StoreError;

/// Errors an engine operation can report.
///
/// The first six variants are validation or state-conflict conditions:
/// the transport maps each to a localized message for the user and the
/// engine keeps serving. `Store` wraps a genuine storage failure,
/// propagated unchanged. Nothing here is fatal and no operation is
/// retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A choice arrived while the room's round is not in progress.
    #[error("room is not ready")]
    RoomNotReady,

    /// An operation that needs a room name got an empty one, or no
    /// current room could be implied for the caller.
    #[error("no room detected")]
    NoRoomDetected,

    /// The invite token is empty or resolves to nothing.
    #[error("not a valid room")]
    InvalidRoom,

    /// The room is no longer accepting joins.
    #[error("room is closed")]
    RoomClosed,

    /// Closing a room that already left the waiting state.
    #[error("already closed")]
    AlreadyClosed,

    /// Restart requested for a room with no members in it.
    #[error("no active rooms")]
    NoActiveRooms,

    /// A storage failure, propagated verbatim.
    #[error(transparent)]
    Store(#[from] StoreError),
}
