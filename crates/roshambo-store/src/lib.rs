//! Durable storage for Roshambo.
//!
//! The only crate that touches the database. Four record families live
//! in SQLite: users, rooms, room invites, and memberships, with
//! cascading foreign keys on the owner side — deleting a user takes
//! their rooms, invites, and memberships with it.
//!
//! # Contract
//!
//! - Every query is typed: a statement decodes into a tuple or row
//!   struct, never into a loose map.
//! - "No matching row" is a normal absence — getters return
//!   `Ok(None)` (or an empty `Vec`), never an error. Callers pick
//!   default values from it; nothing logs it.
//! - Any other statement failure propagates verbatim as
//!   [`StoreError::Database`].
//! - JSON state/settings blobs are encoded and decoded here, at the
//!   boundary; the rest of the system only sees model types.

mod error;
mod rows;
mod schema;
mod store;

pub use error::StoreError;
pub use rows::RoomKey;
pub use store::Store;
