//! Schema creation.
//!
//! Tables are created on open with `IF NOT EXISTS`, so opening an
//! existing database is a no-op. All multi-column relationships are
//! enforced here with cascading deletes; the store methods never have
//! to clean up dependents of a removed user.

use sqlx::SqlitePool;

use crate::StoreError;

const CREATE_USERS: &str = "
CREATE TABLE IF NOT EXISTS users (
    participant_id  INTEGER NOT NULL,
    context_id      INTEGER NOT NULL,
    display_name    TEXT,
    locale          TEXT DEFAULT 'en',
    first_name      TEXT,
    last_name       TEXT,
    last_start      TEXT DEFAULT (current_timestamp),
    games_total     INTEGER DEFAULT 0,
    games_won       INTEGER DEFAULT 0,
    settings        TEXT DEFAULT ('{}'),
    UNIQUE (participant_id, context_id)
);";

const CREATE_ROOMS: &str = "
CREATE TABLE IF NOT EXISTS rooms (
    owner_participant_id  INTEGER NOT NULL,
    owner_context_id      INTEGER NOT NULL,
    name                  TEXT NOT NULL,
    last_used             TEXT DEFAULT (current_timestamp),
    state                 TEXT DEFAULT ('{}'),
    settings              TEXT DEFAULT ('{}'),
    CONSTRAINT rooms_fk_owner
        FOREIGN KEY (owner_participant_id, owner_context_id)
        REFERENCES users (participant_id, context_id) ON DELETE CASCADE,
    UNIQUE (owner_participant_id, owner_context_id, name)
);";

const CREATE_INVITES: &str = "
CREATE TABLE IF NOT EXISTS room_invites (
    owner_participant_id  INTEGER NOT NULL,
    owner_context_id      INTEGER NOT NULL,
    room_name             TEXT NOT NULL,
    token                 TEXT NOT NULL,
    generated_at          TEXT DEFAULT (current_timestamp),
    CONSTRAINT room_invites_fk_room
        FOREIGN KEY (owner_participant_id, owner_context_id, room_name)
        REFERENCES rooms (owner_participant_id, owner_context_id, name)
        ON DELETE CASCADE,
    UNIQUE (token)
);";

// One membership row per member, enforced by the unique pair — joining
// elsewhere replaces the row rather than adding a second one.
const CREATE_MEMBERSHIPS: &str = "
CREATE TABLE IF NOT EXISTS memberships (
    owner_participant_id   INTEGER NOT NULL,
    owner_context_id       INTEGER NOT NULL,
    room_name              TEXT NOT NULL,
    member_participant_id  INTEGER NOT NULL,
    member_context_id      INTEGER NOT NULL,
    state                  TEXT DEFAULT ('{}'),
    CONSTRAINT memberships_fk_room
        FOREIGN KEY (owner_participant_id, owner_context_id, room_name)
        REFERENCES rooms (owner_participant_id, owner_context_id, name)
        ON DELETE CASCADE,
    CONSTRAINT memberships_fk_member
        FOREIGN KEY (member_participant_id, member_context_id)
        REFERENCES users (participant_id, context_id) ON DELETE CASCADE,
    UNIQUE (member_participant_id, member_context_id)
);";

/// Creates the four tables if they do not exist yet.
pub(crate) async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    for statement in [CREATE_USERS, CREATE_ROOMS, CREATE_INVITES, CREATE_MEMBERSHIPS] {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
