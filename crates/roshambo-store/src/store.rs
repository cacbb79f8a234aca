//! The store: prepared, typed statements over the SQLite pool.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use roshambo_model::{
    Client, GameState, Identity, PlayerState, RoomSettings, UserSettings,
};

use crate::{schema, RoomKey, StoreError};

/// Handle to the database. Cheap to clone — wraps a connection pool.
///
/// SQLite serializes writers itself, so the store is safe under
/// concurrent use; the engine adds its own critical section where a
/// read-modify-write sequence must not interleave.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if missing) the database at `path` and ensures
    /// the schema exists.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        schema::migrate(&pool).await?;
        tracing::info!(path, "store opened");
        Ok(Self { pool })
    }

    /// Opens a private in-memory database. Used by tests.
    ///
    /// The pool is pinned to a single connection that never retires:
    /// each SQLite in-memory connection is its own database, so a
    /// second connection (or a reconnect) would see empty tables.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        schema::migrate(&pool).await?;
        Ok(Self { pool })
    }

    // -- users ------------------------------------------------------------

    /// Creates or refreshes a user record on contact.
    ///
    /// Name, locale, and `last_start` are overwritten every time; the
    /// statistics and settings columns are left untouched by the
    /// conflict clause. Returns the user's settings (default for a
    /// brand-new user).
    pub async fn upsert_user(
        &self,
        id: Identity,
        name: &str,
        locale: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<UserSettings, StoreError> {
        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT settings FROM users WHERE participant_id = ?1 AND context_id = ?2",
        )
        .bind(id.participant_id)
        .bind(id.context_id)
        .fetch_optional(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO users
                 (participant_id, context_id, display_name, locale,
                  first_name, last_name, last_start)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, current_timestamp)
             ON CONFLICT (participant_id, context_id) DO UPDATE SET
                 display_name = excluded.display_name,
                 locale       = excluded.locale,
                 first_name   = excluded.first_name,
                 last_name    = excluded.last_name,
                 last_start   = current_timestamp",
        )
        .bind(id.participant_id)
        .bind(id.context_id)
        .bind(name)
        .bind(locale)
        .bind(first_name)
        .bind(last_name)
        .execute(&self.pool)
        .await?;

        match existing {
            Some((blob,)) => decode(&blob),
            None => Ok(UserSettings::default()),
        }
    }

    /// Looks up a user's profile.
    pub async fn user(&self, id: Identity) -> Result<Option<Client>, StoreError> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT display_name, locale FROM users
             WHERE participant_id = ?1 AND context_id = ?2",
        )
        .bind(id.participant_id)
        .bind(id.context_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(name, locale)| Client::new(id, name, locale)))
    }

    /// Lifetime statistics: `(games_total, games_won)`.
    pub async fn user_stats(
        &self,
        id: Identity,
    ) -> Result<Option<(i64, i64)>, StoreError> {
        let row = sqlx::query_as(
            "SELECT games_total, games_won FROM users
             WHERE participant_id = ?1 AND context_id = ?2",
        )
        .bind(id.participant_id)
        .bind(id.context_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Charges a finished game without a win.
    pub async fn add_loss(&self, id: Identity) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE users SET games_total = games_total + 1
             WHERE participant_id = ?1 AND context_id = ?2",
        )
        .bind(id.participant_id)
        .bind(id.context_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Credits a finished, won game.
    pub async fn add_win(&self, id: Identity) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE users SET games_total = games_total + 1,
                              games_won = games_won + 1
             WHERE participant_id = ?1 AND context_id = ?2",
        )
        .bind(id.participant_id)
        .bind(id.context_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persists a user's settings blob.
    pub async fn update_user_settings(
        &self,
        id: Identity,
        settings: &UserSettings,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE users SET settings = ?3
             WHERE participant_id = ?1 AND context_id = ?2",
        )
        .bind(id.participant_id)
        .bind(id.context_id)
        .bind(encode(settings)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Removes a user. Their rooms, invites, and memberships cascade.
    pub async fn remove_user(&self, id: Identity) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM users WHERE participant_id = ?1 AND context_id = ?2",
        )
        .bind(id.participant_id)
        .bind(id.context_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // -- rooms ------------------------------------------------------------

    /// Creates the room on first reference; thereafter only bumps
    /// `last_used`. State and settings survive the conflict.
    pub async fn upsert_room(
        &self,
        owner: Identity,
        name: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO rooms (owner_participant_id, owner_context_id, name)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (owner_participant_id, owner_context_id, name)
             DO UPDATE SET last_used = current_timestamp",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetches both blobs of a room row in one round-trip.
    pub async fn room_blobs(
        &self,
        owner: Identity,
        name: &str,
    ) -> Result<Option<(RoomSettings, GameState)>, StoreError> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT settings, state FROM rooms
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND name = ?3",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some((settings, state)) => Ok(Some((decode(&settings)?, decode(&state)?))),
            None => Ok(None),
        }
    }

    /// Fetches just the game state of a room.
    pub async fn room_state(
        &self,
        owner: Identity,
        name: &str,
    ) -> Result<Option<GameState>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT state FROM rooms
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND name = ?3",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|(blob,)| decode(&blob)).transpose()
    }

    /// Persists a room's game state.
    pub async fn update_room_state(
        &self,
        owner: Identity,
        name: &str,
        state: &GameState,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE rooms SET state = ?4
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND name = ?3",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .bind(encode(state)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetches a room's settings blob.
    pub async fn room_settings(
        &self,
        owner: Identity,
        name: &str,
    ) -> Result<Option<RoomSettings>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT settings FROM rooms
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND name = ?3",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|(blob,)| decode(&blob)).transpose()
    }

    /// Persists a room's settings blob.
    pub async fn update_room_settings(
        &self,
        owner: Identity,
        name: &str,
        settings: &RoomSettings,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE rooms SET settings = ?4
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND name = ?3",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .bind(encode(settings)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // -- invites ----------------------------------------------------------

    /// Binds `token` to a room, replacing any previous token for that
    /// room — one live invite per room.
    pub async fn replace_invite(
        &self,
        owner: Identity,
        name: &str,
        token: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM room_invites
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND room_name = ?3",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "INSERT INTO room_invites
                 (owner_participant_id, owner_context_id, room_name, token)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The live token for a room, if one was ever generated.
    pub async fn invite_for_room(
        &self,
        owner: Identity,
        name: &str,
    ) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT token FROM room_invites
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND room_name = ?3",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(token,)| token))
    }

    /// Collision probe for the token generator.
    pub async fn invite_exists(&self, token: &str) -> Result<bool, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT count(*) FROM room_invites WHERE token = ?1")
                .bind(token)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Resolves an invite token to its room key (owner name included,
    /// via the users join).
    pub async fn room_by_invite(
        &self,
        token: &str,
    ) -> Result<Option<RoomKey>, StoreError> {
        let row: Option<(i64, i64, String, String)> = sqlx::query_as(
            "SELECT owner_participant_id, owner_context_id, room_name,
                    display_name
             FROM room_invites
             INNER JOIN users
                ON participant_id = owner_participant_id
               AND context_id = owner_context_id
             WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(pid, cid, name, owner_name)| RoomKey {
            owner: Identity::new(pid, cid),
            owner_name,
            name,
        }))
    }

    // -- memberships ------------------------------------------------------

    /// The room a member currently belongs to, if any. At most one row
    /// can exist per member.
    pub async fn room_for_member(
        &self,
        member: Identity,
    ) -> Result<Option<RoomKey>, StoreError> {
        let row: Option<(i64, i64, String, String)> = sqlx::query_as(
            "SELECT owner_participant_id, owner_context_id, room_name,
                    display_name
             FROM memberships
             INNER JOIN users
                ON participant_id = owner_participant_id
               AND context_id = owner_context_id
             WHERE member_participant_id = ?1 AND member_context_id = ?2",
        )
        .bind(member.participant_id)
        .bind(member.context_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(pid, cid, name, owner_name)| RoomKey {
            owner: Identity::new(pid, cid),
            owner_name,
            name,
        }))
    }

    /// Inserts a membership row with a fresh default state. `REPLACE`
    /// on the unique member pair means joining while already a member
    /// somewhere overwrites the old row.
    pub async fn add_member(
        &self,
        owner: Identity,
        name: &str,
        member: Identity,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO memberships
                 (owner_participant_id, owner_context_id, room_name,
                  member_participant_id, member_context_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .bind(member.participant_id)
        .bind(member.context_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Removes one member's row.
    pub async fn remove_member(
        &self,
        owner: Identity,
        name: &str,
        member: Identity,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM memberships
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND room_name = ?3
               AND member_participant_id = ?4 AND member_context_id = ?5",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .bind(member.participant_id)
        .bind(member.context_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes every membership row of a room in bulk.
    pub async fn clear_members(
        &self,
        owner: Identity,
        name: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM memberships
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND room_name = ?3",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Resets every member of a room to the default round state.
    pub async fn reset_member_states(
        &self,
        owner: Identity,
        name: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE memberships SET state = '{}'
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND room_name = ?3",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All members of a room with their profiles and round states,
    /// in the stable rendering order (name, then newest context).
    pub async fn members(
        &self,
        owner: Identity,
        name: &str,
    ) -> Result<Vec<Client>, StoreError> {
        let rows: Vec<(i64, i64, String, String, String)> = sqlx::query_as(
            "SELECT member_participant_id, member_context_id,
                    display_name, locale, state
             FROM memberships
             INNER JOIN users
                ON member_participant_id = participant_id
               AND member_context_id = context_id
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND room_name = ?3
             ORDER BY display_name ASC, member_context_id DESC",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(pid, cid, name, locale, state)| {
                Ok(Client::member(
                    Identity::new(pid, cid),
                    name,
                    locale,
                    decode::<PlayerState>(&state)?,
                ))
            })
            .collect()
    }

    /// Member identities and locales only — enough to address an
    /// update at each of them without decoding round states.
    pub async fn member_identities(
        &self,
        owner: Identity,
        name: &str,
    ) -> Result<Vec<Client>, StoreError> {
        let rows: Vec<(i64, i64, String, String)> = sqlx::query_as(
            "SELECT member_participant_id, member_context_id,
                    display_name, locale
             FROM memberships
             INNER JOIN users
                ON member_participant_id = participant_id
               AND member_context_id = context_id
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND room_name = ?3",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(pid, cid, name, locale)| {
                Client::new(Identity::new(pid, cid), name, locale)
            })
            .collect())
    }

    /// One member's round state.
    pub async fn member_state(
        &self,
        owner: Identity,
        name: &str,
        member: Identity,
    ) -> Result<Option<PlayerState>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT state FROM memberships
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND room_name = ?3
               AND member_participant_id = ?4 AND member_context_id = ?5",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .bind(member.participant_id)
        .bind(member.context_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|(blob,)| decode(&blob)).transpose()
    }

    /// Persists one member's round state.
    pub async fn update_member_state(
        &self,
        owner: Identity,
        name: &str,
        member: Identity,
        state: &PlayerState,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE memberships SET state = ?6
             WHERE owner_participant_id = ?1 AND owner_context_id = ?2
               AND room_name = ?3
               AND member_participant_id = ?4 AND member_context_id = ?5",
        )
        .bind(owner.participant_id)
        .bind(owner.context_id)
        .bind(name)
        .bind(member.participant_id)
        .bind(member.context_id)
        .bind(encode(state)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Encodes a blob at the store boundary.
fn encode<T: Serialize>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a blob at the store boundary.
fn decode<T: DeserializeOwned>(blob: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_str(blob)?)
}
