//! Room entity and its lifecycle state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Identity, RoomSettings};

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle state of a room's game.
///
/// Within one round the transitions are strictly forward, but the
/// machine is cyclic across rounds and games:
///
/// ```text
/// Waiting → ClosedAwaitingStart → Started ─┐
///                   ↑  (round resolves)    │
///                   └───────────────────────┘
/// ```
///
/// - **Waiting**: the room exists and accepts joins. The initial state,
///   and the state a room returns to when its owner exits.
/// - **ClosedAwaitingStart**: joins are refused; either the first round
///   is about to start or a round just resolved.
/// - **Started**: a round is in progress and choices are being
///   collected.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum Lifecycle {
    #[default]
    Waiting,
    ClosedAwaitingStart,
    Started,
}

impl Lifecycle {
    /// Returns `true` if the room is accepting new members.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if a round is collecting choices.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::ClosedAwaitingStart => write!(f, "ClosedAwaitingStart"),
            Self::Started => write!(f, "Started"),
        }
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The persisted game state of a room: where it is in its lifecycle
/// and which round is current.
///
/// Stored as the room-row JSON blob. The default value (`Waiting`,
/// round 0) doubles as the "cleared" state written when the owner
/// exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    /// Current lifecycle state.
    pub lifecycle: Lifecycle,
    /// The round in progress (1-based once a game starts; 0 between
    /// games).
    pub round: u32,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A named game session owned by one identity.
///
/// Rooms are keyed by `(owner, name)` — there is no surrogate id. The
/// struct is a detached snapshot of the room row; the store is the
/// source of truth for `game` between engine calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// The identity that created (and controls) the room.
    pub owner: Identity,
    /// The owner's display name, denormalized for event rendering.
    pub owner_name: String,
    /// Room name, unique per owner.
    pub name: String,
    /// Room-scoped settings blob.
    pub settings: RoomSettings,
    /// Lifecycle + round counter.
    pub game: GameState,
}

impl Room {
    /// Creates a room snapshot in the default (waiting, round 0) state.
    pub fn new(owner: Identity, owner_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner,
            owner_name: owner_name.into(),
            name: name.into(),
            settings: RoomSettings::default(),
            game: GameState::default(),
        }
    }

    /// Returns `true` if `id` owns this room.
    pub fn is_owned_by(&self, id: &Identity) -> bool {
        self.owner == *id
    }

    /// Returns `true` if this snapshot refers to the same room as the
    /// `(owner, name)` key.
    pub fn locate(&self, owner: &Identity, name: &str) -> bool {
        self.owner == *owner && self.name == name
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
