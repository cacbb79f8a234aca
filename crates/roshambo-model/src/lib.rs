//! Core data model for Roshambo.
//!
//! This crate defines every value type the rest of the system passes
//! around: participant identities, the room/game/player entities that
//! the store persists, versioned settings blobs, and the notification
//! events the engine emits.
//!
//! Nothing in here does I/O. The store serializes these types to JSON
//! at its boundary; the engine mutates them in memory and pushes
//! [`Update`]s onto the notification queue.
//!
//! # Key types
//!
//! - [`Identity`] — composite participant/conversation key
//! - [`Client`] — runtime view of a user record
//! - [`Room`], [`GameState`], [`Lifecycle`] — a game session
//! - [`PlayerState`], [`PlayerStatus`] — per-member round state
//! - [`Update`] — the notification event protocol

mod client;
mod identity;
mod player;
mod room;
mod settings;
mod update;

pub use client::{Client, ClientStatus};
pub use identity::Identity;
pub use player::{
    winning_move, PlayerState, PlayerStatus, CHOICE_PAPER, CHOICE_SCISSORS,
    CHOICE_STONE, CHOICE_UNSET,
};
pub use room::{GameState, Lifecycle, Room};
pub use settings::{RoomSettings, UserSettings};
pub use update::Update;
