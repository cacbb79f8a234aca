//! The session engine for Roshambo.
//!
//! [`Pool`] is the orchestration core: it advances rooms through their
//! lifecycle, aggregates simultaneous choices into a round outcome,
//! eliminates losers, detects session completion, and emits an ordered
//! stream of [`Update`](roshambo_model::Update) events for the
//! transport layer to render and deliver.
//!
//! # How it fits in the stack
//!
//! ```text
//! Transport glue (outside this workspace)
//!     ↕  resolves identities, invokes Pool operations, drains updates
//! Engine (this crate)  ← lifecycle + round resolution + invite tokens
//!     ↕
//! Store (roshambo-store)  ← durable rows, JSON blobs
//! ```
//!
//! # Key types
//!
//! - [`Pool`] — the engine itself; one instance per process
//! - [`Actor`] — a resolved client plus their current room
//! - [`UpdateSender`]/[`UpdateReceiver`] — the notification queue ends
//! - [`EngineError`] — everything an operation can report

mod actor;
mod error;
mod invite;
mod pool;
mod queue;

pub use actor::Actor;
pub use error::EngineError;
pub use pool::Pool;
pub use queue::{update_queue, UpdateReceiver, UpdateSender, DEFAULT_QUEUE_CAPACITY};
