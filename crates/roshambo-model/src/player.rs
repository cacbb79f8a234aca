//! Per-member round state and the round-resolution lookup.

use serde::{Deserialize, Serialize};

/// "No choice submitted yet" — every player starts each round here.
pub const CHOICE_UNSET: u32 = 0;
/// Stone. Beats scissors.
pub const CHOICE_STONE: u32 = 1;
/// Scissors. Beats paper.
pub const CHOICE_SCISSORS: u32 = 2;
/// Paper. Beats stone.
pub const CHOICE_PAPER: u32 = 4;

/// Determines the winning move from the OR-aggregate of all PLAYING
/// members' choices.
///
/// The moves are bit flags, so the aggregate encodes *which set* of
/// moves was played this round. Exactly two distinct moves produce a
/// winner; anything else (everyone picked the same move, all three
/// moves present, or nobody chose) is a tie and returns
/// [`CHOICE_UNSET`].
///
/// The result is a pure function of the aggregate, so it is invariant
/// under any permutation of the members.
pub fn winning_move(aggregate: u32) -> u32 {
    match aggregate {
        3 => CHOICE_STONE,    // stone | scissors
        5 => CHOICE_PAPER,    // stone | paper
        6 => CHOICE_SCISSORS, // scissors | paper
        _ => CHOICE_UNSET,
    }
}

/// Whether a member may still submit choices.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum PlayerStatus {
    /// Still in the game: gets a turn each round.
    #[default]
    Playing,
    /// Eliminated (or joined as a spectator): sees rounds, never votes.
    Watching,
}

impl PlayerStatus {
    /// Returns `true` if this member submits choices.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// A member's round state, persisted as the membership-row JSON blob.
///
/// `history` is indexed by round: slot `i` holds the choice submitted
/// for round `i + 1`. Recording a choice for round `k` grows the
/// vector to exactly `k` slots and preserves every earlier slot, so
/// the history length always equals the highest round the member has
/// voted in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    /// Playing or watching.
    pub status: PlayerStatus,
    /// The choice for the round in progress; [`CHOICE_UNSET`] until the
    /// member votes, and reset to unset when a new round starts.
    pub choice: u32,
    /// One recorded choice per completed-or-current round.
    pub history: Vec<u32>,
}

impl PlayerState {
    /// Records `choice` for `round` (1-based) in both the live choice
    /// slot and the history.
    pub fn record_choice(&mut self, round: u32, choice: u32) {
        self.choice = choice;
        self.history.resize(round as usize, CHOICE_UNSET);
        self.history[round as usize - 1] = choice;
    }

    /// Clears the live choice at the start of a round. History keeps
    /// its slots.
    pub fn clear_choice(&mut self) {
        self.choice = CHOICE_UNSET;
    }
}
