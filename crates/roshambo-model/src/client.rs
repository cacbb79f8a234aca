//! Runtime view of a user: identity plus what we know about them.

use serde::{Deserialize, Serialize};

use crate::{Identity, PlayerState};

/// Where a client is in the join handshake.
///
/// Join operations set [`Waiting`](ClientStatus::Waiting) on entry and
/// [`Authorized`](ClientStatus::Authorized) once the membership row is
/// in place; the transport layer uses
/// [`WaitingNewRoom`](ClientStatus::WaitingNewRoom) while it collects a
/// room name from the user.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum ClientStatus {
    /// A join is in flight (or nothing has happened yet).
    #[default]
    Waiting,
    /// The transport is waiting for the user to name a room.
    WaitingNewRoom,
    /// The client holds a membership row in some room.
    Authorized,
}

impl ClientStatus {
    /// Returns `true` once a join has completed.
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// A user as the engine sees them: the persisted profile fields plus
/// the round state of their current membership (if any).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Composite key into the `users` table.
    pub id: Identity,
    /// Display name, refreshed on every contact.
    pub name: String,
    /// IETF locale code ("en", "ru", ...). The transport maps this to
    /// its message catalog; the core only carries it through.
    pub locale: String,
    /// Join-handshake state.
    pub status: ClientStatus,
    /// Round state from the membership row. Default when the client is
    /// not in a room.
    pub player: PlayerState,
}

impl Client {
    /// Creates a client with no membership state.
    pub fn new(id: Identity, name: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            locale: locale.into(),
            status: ClientStatus::default(),
            player: PlayerState::default(),
        }
    }

    /// Creates a client hydrated from a membership row.
    pub fn member(
        id: Identity,
        name: impl Into<String>,
        locale: impl Into<String>,
        player: PlayerState,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            locale: locale.into(),
            status: ClientStatus::Authorized,
            player,
        }
    }

    /// Returns `true` if this client is the given identity.
    pub fn locate(&self, id: &Identity) -> bool {
        self.id == *id
    }
}
