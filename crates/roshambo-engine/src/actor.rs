//! The actor: what the transport layer gets back when it resolves an
//! inbound event to a participant.

use roshambo_model::{Client, Identity, Room, UserSettings};

/// A resolved client bundled with their settings and current room.
///
/// Produced by [`Pool::actor`](crate::Pool::actor) once per inbound
/// transport event and discarded afterwards — the store remains the
/// source of truth between events.
#[derive(Debug, Clone)]
pub struct Actor {
    /// The participant's profile and join status.
    pub client: Client,
    /// Their settings blob, decoded.
    pub settings: UserSettings,
    /// The room they are a member of, if any.
    pub room: Option<Room>,
}

impl Actor {
    /// The participant's identity.
    pub fn identity(&self) -> Identity {
        self.client.id
    }

    /// The participant's locale code.
    pub fn locale(&self) -> &str {
        &self.client.locale
    }

    /// Returns `true` once a join has completed for this client.
    pub fn is_authorized(&self) -> bool {
        self.client.status.is_authorized()
    }

    /// Returns `true` if the participant currently belongs to a room.
    pub fn in_room(&self) -> bool {
        self.room.is_some()
    }
}
