//! Typed per-query result rows.

use roshambo_model::Identity;

/// The key of a room plus the owner's display name, as returned by the
/// invite and membership lookups (both join `users` to pick the name
/// up in one round-trip).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomKey {
    /// Room owner.
    pub owner: Identity,
    /// Owner display name at lookup time.
    pub owner_name: String,
    /// Room name, unique per owner.
    pub name: String,
}
