//! Notification events emitted by the engine.
//!
//! Every event is already fanned out per recipient: the engine pushes
//! one `Update` per member who should hear about something, and the
//! transport renders exactly one message per event. The enum is a
//! closed protocol internal to one deployment — variants and their
//! fields change together with the single consumer.

use crate::{Client, PlayerStatus, Room};

/// One notification to deliver to one recipient.
///
/// The Go ancestor of this type carried `(kind, []any)` pairs that the
/// consumer decoded positionally; here each kind is a struct variant,
/// so the consumer destructures instead of downcasting.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// A member left the recipient's room voluntarily.
    MemberDisconnected {
        recipient: Client,
        room: Room,
        /// Display name of the member who left.
        member_name: String,
    },

    /// A member joined the recipient's room (the joiner also receives
    /// this about themselves).
    MemberConnected {
        recipient: Client,
        room: Room,
        /// Display name of the member who joined.
        member_name: String,
    },

    /// The room was torn down by its owner.
    RoomFinished { recipient: Client, room: Room },

    /// The room stopped accepting joins; a game is about to start.
    RoomClosed { recipient: Client, room: Room },

    /// A round resolved.
    RoundFinished {
        recipient: Client,
        room: Room,
        /// The winning move bitmask, or `CHOICE_UNSET` on a tie.
        winning_move: u32,
        /// The recipient's status *before* this round's eliminations,
        /// so the transport can tell "you lost" from "you watched".
        prior_status: PlayerStatus,
    },

    /// A new round started and the recipient is playing in it.
    YourTurn {
        recipient: Client,
        room: Room,
        round: u32,
    },

    /// The recipient outlasted everyone and won the session.
    YouWin { recipient: Client, room: Room },

    /// A new round started and the recipient is watching it.
    WaitForTurn { recipient: Client, round: u32 },

    /// The game is over; sent to the room owner with a token they can
    /// share to restart.
    SessionFinished {
        recipient: Client,
        room: Room,
        invite_token: String,
    },

    /// The transport asks the owner to close the room (e.g. a "close"
    /// button shown under the join announcement). Emitted by transport
    /// glue, never by round resolution.
    CloseRoomRequest { recipient: Client, room: Room },
}

impl Update {
    /// The client this update must be delivered to.
    pub fn recipient(&self) -> &Client {
        match self {
            Self::MemberDisconnected { recipient, .. }
            | Self::MemberConnected { recipient, .. }
            | Self::RoomFinished { recipient, .. }
            | Self::RoomClosed { recipient, .. }
            | Self::RoundFinished { recipient, .. }
            | Self::YourTurn { recipient, .. }
            | Self::YouWin { recipient, .. }
            | Self::WaitForTurn { recipient, .. }
            | Self::SessionFinished { recipient, .. }
            | Self::CloseRoomRequest { recipient, .. } => recipient,
        }
    }
}
