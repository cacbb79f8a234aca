//! # Roshambo
//!
//! Session core for turn-based elimination rock-paper-scissors.
//!
//! Any number of members join a room, everyone throws simultaneously
//! each round, the round's OR-aggregate decides the winning move, and
//! members who threw anything else are eliminated. Rounds repeat until
//! at most one player stands. The crate owns identity, persistence,
//! the room state machine, and the notification stream; rendering and
//! delivery belong to a transport layer built on top.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use roshambo::prelude::*;
//!
//! # async fn demo() -> Result<(), RoshamboError> {
//! let (pool, mut updates) = Roshambo::builder()
//!     .database_path("roshambo.db")
//!     .build()
//!     .await?;
//!
//! let mut actor = pool.actor(Identity::new(42, 7), "ann", "Ann", "", "en").await?;
//! let room = pool.join_own_room(&mut actor.client, "den").await?;
//! let token = pool.invite_token(&room).await?;
//! // Hand `token` out, wait for joins, then:
//! pool.close_room(&room).await?;
//!
//! while let Some(update) = updates.recv().await {
//!     // Render and deliver.
//!     let _ = update.recipient();
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;

pub use builder::{Roshambo, RoshamboBuilder};
pub use error::RoshamboError;

pub use roshambo_engine::{
    Actor, EngineError, Pool, UpdateReceiver, UpdateSender, DEFAULT_QUEUE_CAPACITY,
};
pub use roshambo_model::{
    winning_move, Client, ClientStatus, GameState, Identity, Lifecycle,
    PlayerState, PlayerStatus, Room, RoomSettings, Update, UserSettings,
    CHOICE_PAPER, CHOICE_SCISSORS, CHOICE_STONE, CHOICE_UNSET,
};
pub use roshambo_store::{RoomKey, Store, StoreError};

/// Installs a process-wide tracing subscriber driven by `RUST_LOG`
/// (default level `info`). Call once, early; a second call is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

/// The common imports for building a transport on Roshambo.
pub mod prelude {
    pub use crate::{
        Actor, Client, Identity, Pool, Room, Roshambo, RoshamboError, Update,
        UpdateReceiver, CHOICE_PAPER, CHOICE_SCISSORS, CHOICE_STONE,
    };
}
