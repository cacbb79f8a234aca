//! Participant identity: who is talking to us, and from where.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A composite key identifying one participant within one conversation.
///
/// The transport layer resolves every inbound event to one of these;
/// the same human in two different conversations is two identities.
/// It is the primary key of the `users` table and the owner key of
/// rooms, so it derives `Hash` and a total order.
///
/// The derived `Ord` compares fields in declaration order, which gives
/// exactly the lexicographic (participant, context) ordering the store
/// relies on for deterministic comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Identity {
    /// The participant's id in the messaging network.
    pub participant_id: i64,
    /// The conversation (chat/channel) the participant spoke from.
    pub context_id: i64,
}

impl Identity {
    /// Creates an identity from its two raw ids.
    pub fn new(participant_id: i64, context_id: i64) -> Self {
        Self {
            participant_id,
            context_id,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.participant_id, self.context_id)
    }
}
