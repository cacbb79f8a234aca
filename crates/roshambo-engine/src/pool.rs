//! The pool: the concurrency-safe state machine that drives rooms.
//!
//! Every public operation mutates the store and may emit updates.
//! Absence of a row is never an error at this layer either — a missing
//! room state reads as the default (waiting, round 0).
//!
//! # Concurrency
//!
//! The store is safe under concurrent use on its own, but round
//! resolution is a read-modify-write over the aggregate vote state, so
//! [`Pool::submit_choice`] holds an engine-wide mutex for its whole
//! choice-through-round-advance sequence. The internal helpers it
//! calls (`resolve_round`, `next_round`, `exit_room_inner`) never
//! re-acquire that lock: the recursion from "round resolved" into
//! "next round starts" is a tail-continuation within one acquisition.
//!
//! The critical section performs several storage round-trips without a
//! surrounding transaction. A storage failure mid-sequence can leave
//! partial state; the next call re-reads and proceeds from whatever
//! was persisted.

use tokio::sync::Mutex;

use roshambo_model::{
    winning_move, Client, ClientStatus, GameState, Identity, Lifecycle,
    PlayerStatus, Room, RoomSettings, Update, UserSettings, CHOICE_UNSET,
};
use roshambo_store::{RoomKey, Store};

use crate::queue::{update_queue, UpdateReceiver, UpdateSender};
use crate::{Actor, EngineError, DEFAULT_QUEUE_CAPACITY};

/// The session engine. One instance serves every room in the process.
pub struct Pool {
    store: Store,
    updates: UpdateSender,
    /// Serializes choice submission through round advance, across all
    /// rooms. See the module docs; a per-room lock table would restore
    /// cross-room parallelism if load ever demands it.
    choice_lock: Mutex<()>,
}

impl Pool {
    /// Creates a pool over `store` with the default queue capacity.
    /// Returns the consumer end of the notification queue; the
    /// transport layer drains it independently.
    pub fn new(store: Store) -> (Self, UpdateReceiver) {
        Self::with_queue_capacity(store, DEFAULT_QUEUE_CAPACITY)
    }

    /// Like [`Pool::new`] with an explicit queue capacity.
    pub fn with_queue_capacity(store: Store, capacity: usize) -> (Self, UpdateReceiver) {
        let (updates, receiver) = update_queue(capacity);
        (
            Self {
                store,
                updates,
                choice_lock: Mutex::new(()),
            },
            receiver,
        )
    }

    /// The underlying store, for transport glue that needs raw reads
    /// (e.g. rendering the member list with histories).
    pub fn store(&self) -> &Store {
        &self.store
    }

    // -- identity resolution ----------------------------------------------

    /// Resolves (creating or refreshing) the user behind an inbound
    /// event and bundles them with their settings and current room.
    pub async fn actor(
        &self,
        id: Identity,
        name: &str,
        first_name: &str,
        last_name: &str,
        locale: &str,
    ) -> Result<Actor, EngineError> {
        let settings = self
            .store
            .upsert_user(id, name, locale, first_name, last_name)
            .await?;
        let client = Client::new(id, name, locale);
        let room = self.room_for_client(&client).await?;
        Ok(Actor {
            client,
            settings,
            room,
        })
    }

    /// Looks up an existing user without touching their record.
    pub async fn client(&self, id: Identity) -> Result<Option<Client>, EngineError> {
        Ok(self.store.user(id).await?)
    }

    /// Lifetime statistics `(games_total, games_won)` for a user.
    pub async fn stats(&self, id: Identity) -> Result<Option<(i64, i64)>, EngineError> {
        Ok(self.store.user_stats(id).await?)
    }

    /// Persists a client's settings blob.
    pub async fn update_client_settings(
        &self,
        client: &Client,
        settings: &UserSettings,
    ) -> Result<(), EngineError> {
        Ok(self.store.update_user_settings(client.id, settings).await?)
    }

    /// Persists the settings blob of one of the client's own rooms.
    pub async fn update_room_settings(
        &self,
        owner: &Client,
        name: &str,
        settings: &RoomSettings,
    ) -> Result<(), EngineError> {
        if name.is_empty() {
            return Err(EngineError::NoRoomDetected);
        }
        Ok(self
            .store
            .update_room_settings(owner.id, name, settings)
            .await?)
    }

    // -- room lookup ------------------------------------------------------

    /// Gets or creates a room owned by `owner`. Idempotent: an
    /// existing room keeps its state and settings, a new one starts
    /// waiting at round 0.
    pub async fn room(&self, owner: &Client, name: &str) -> Result<Room, EngineError> {
        if name.is_empty() {
            return Err(EngineError::NoRoomDetected);
        }
        let key = RoomKey {
            owner: owner.id,
            owner_name: owner.name.clone(),
            name: name.to_string(),
        };
        self.load_room(&key, true).await
    }

    /// The room a client is currently a member of, if any.
    pub async fn room_for_client(
        &self,
        client: &Client,
    ) -> Result<Option<Room>, EngineError> {
        match self.store.room_for_member(client.id).await? {
            Some(key) => Ok(Some(self.load_room(&key, false).await?)),
            None => Ok(None),
        }
    }

    /// Resolves an invite token to its room.
    pub async fn room_by_token(&self, token: &str) -> Result<Room, EngineError> {
        if token.is_empty() {
            return Err(EngineError::InvalidRoom);
        }
        let key = self
            .store
            .room_by_invite(token)
            .await?
            .ok_or(EngineError::InvalidRoom)?;
        self.load_room(&key, true).await
    }

    /// Materializes a room snapshot from its key. `touch` upserts the
    /// row first (creating it on first reference, bumping `last_used`
    /// otherwise).
    async fn load_room(&self, key: &RoomKey, touch: bool) -> Result<Room, EngineError> {
        if touch {
            self.store.upsert_room(key.owner, &key.name).await?;
        }
        let mut room = Room::new(key.owner, key.owner_name.clone(), key.name.clone());
        if let Some((settings, game)) = self.store.room_blobs(key.owner, &key.name).await? {
            room.settings = settings;
            room.game = game;
        }
        Ok(room)
    }

    // -- joining ----------------------------------------------------------

    /// Joins `client` to the room behind an invite token.
    ///
    /// Fails with [`EngineError::RoomClosed`] once the room has left
    /// the waiting state — invitees cannot enter a running game.
    pub async fn join_by_token(
        &self,
        client: &mut Client,
        token: &str,
    ) -> Result<Room, EngineError> {
        client.status = ClientStatus::Waiting;
        let room = self.room_by_token(token).await?;
        if !room.game.lifecycle.is_joinable() {
            return Err(EngineError::RoomClosed);
        }
        self.add_member(&room, client).await?;
        client.status = ClientStatus::Authorized;
        Ok(room)
    }

    /// Joins `client` to a room identified by its owner and name,
    /// creating the room on first reference.
    pub async fn join_named_room(
        &self,
        owner: &Client,
        name: &str,
        client: &mut Client,
    ) -> Result<Room, EngineError> {
        client.status = ClientStatus::Waiting;
        let room = self.room(owner, name).await?;
        self.add_member(&room, client).await?;
        client.status = ClientStatus::Authorized;
        Ok(room)
    }

    /// Joins `client` to their own room (creating it on first use).
    pub async fn join_own_room(
        &self,
        client: &mut Client,
        name: &str,
    ) -> Result<Room, EngineError> {
        let owner = client.clone();
        self.join_named_room(&owner, name, client).await
    }

    /// Inserts the membership row and announces the arrival.
    ///
    /// A member belongs to at most one room: joining while a member of
    /// a *different* room exits that room first, with the usual
    /// departure notifications.
    async fn add_member(&self, room: &Room, client: &Client) -> Result<(), EngineError> {
        if let Some(current) = self.store.room_for_member(client.id).await? {
            if !(current.owner == room.owner && current.name == room.name) {
                let previous = self.load_room(&current, false).await?;
                self.exit_room(&previous, client).await?;
            }
        }

        self.store.add_member(room.owner, &room.name, client.id).await?;
        tracing::info!(room = %room, member = %client.id, "member joined");

        for member in self.store.member_identities(room.owner, &room.name).await? {
            self.updates.push(Update::MemberConnected {
                recipient: member,
                room: room.clone(),
                member_name: client.name.clone(),
            });
        }
        Ok(())
    }

    // -- lifecycle --------------------------------------------------------

    /// Closes a waiting room and starts the game. Only legal from the
    /// waiting state; anything else reports
    /// [`EngineError::AlreadyClosed`].
    pub async fn close_room(&self, room: &Room) -> Result<(), EngineError> {
        let state = self
            .store
            .room_state(room.owner, &room.name)
            .await?
            .unwrap_or_default();
        if !state.lifecycle.is_joinable() {
            return Err(EngineError::AlreadyClosed);
        }
        self.restart_room(room).await
    }

    /// Resets the room for a fresh game: round counter to zero, every
    /// member back to the default round state, one room-closed
    /// notification each — then the first round starts immediately.
    pub async fn restart_room(&self, room: &Room) -> Result<(), EngineError> {
        let members = self.store.member_identities(room.owner, &room.name).await?;
        if members.is_empty() {
            return Err(EngineError::NoActiveRooms);
        }

        let state = GameState {
            lifecycle: Lifecycle::ClosedAwaitingStart,
            round: 0,
        };
        self.store.update_room_state(room.owner, &room.name, &state).await?;
        self.store.reset_member_states(room.owner, &room.name).await?;
        tracing::info!(room = %room, members = members.len(), "room closed for game start");

        for member in members {
            self.updates.push(Update::RoomClosed {
                recipient: member,
                room: room.clone(),
            });
        }

        self.next_round(room).await
    }

    /// Removes `client` from `room`.
    ///
    /// When the owner leaves, the whole room is torn down: memberships
    /// cleared, game state reset to waiting, and everyone (owner
    /// included) notified that the room is finished. Anyone else just
    /// drops their own row, and the remaining members hear about it.
    pub async fn exit_room(&self, room: &Room, client: &Client) -> Result<(), EngineError> {
        if room.is_owned_by(&client.id) {
            let members = self.store.member_identities(room.owner, &room.name).await?;
            self.store.clear_members(room.owner, &room.name).await?;
            self.store
                .update_room_state(room.owner, &room.name, &GameState::default())
                .await?;
            tracing::info!(room = %room, "room torn down by owner");

            for member in members {
                self.updates.push(Update::RoomFinished {
                    recipient: member,
                    room: room.clone(),
                });
            }
        } else {
            self.store.remove_member(room.owner, &room.name, client.id).await?;
            tracing::info!(room = %room, member = %client.id, "member left");

            for member in self.store.member_identities(room.owner, &room.name).await? {
                self.updates.push(Update::MemberDisconnected {
                    recipient: member,
                    room: room.clone(),
                    member_name: client.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Starts the next round: lifecycle to started, round counter up,
    /// every live choice cleared, and each member told whose turn it
    /// is. Callers hold whatever exclusion they need — this helper
    /// never takes the choice lock.
    async fn next_round(&self, room: &Room) -> Result<(), EngineError> {
        let members = self.store.members(room.owner, &room.name).await?;
        let mut state = self
            .store
            .room_state(room.owner, &room.name)
            .await?
            .unwrap_or_default();

        state.lifecycle = Lifecycle::Started;
        state.round += 1;
        self.store.update_room_state(room.owner, &room.name, &state).await?;
        tracing::debug!(room = %room, round = state.round, "round started");

        for mut member in members {
            member.player.clear_choice();
            self.store
                .update_member_state(room.owner, &room.name, member.id, &member.player)
                .await?;

            if member.player.status.is_playing() {
                self.updates.push(Update::YourTurn {
                    recipient: member,
                    room: room.clone(),
                    round: state.round,
                });
            } else {
                self.updates.push(Update::WaitForTurn {
                    recipient: member,
                    round: state.round,
                });
            }
        }
        Ok(())
    }

    // -- round resolution -------------------------------------------------

    /// Records a member's choice and, when it completes the round,
    /// resolves it: eliminations, statistics, notifications, and
    /// either the next round or the end of the session.
    ///
    /// The whole sequence runs under the engine-wide choice lock.
    ///
    /// A `round` outside `[1, 255]` is not an error: the transport
    /// sends such values when a stale keyboard is tapped after the
    /// member effectively left, so it is treated as an exit request.
    pub async fn submit_choice(
        &self,
        client: &Client,
        room: &Room,
        round: i64,
        choice: u32,
    ) -> Result<(), EngineError> {
        let _guard = self.choice_lock.lock().await;

        let state = self
            .store
            .room_state(room.owner, &room.name)
            .await?
            .unwrap_or_default();
        if !state.lifecycle.is_started() {
            return Err(EngineError::RoomNotReady);
        }

        if !(1..=255).contains(&round) {
            return self.exit_room(room, client).await;
        }
        let round = round as u32;

        let mut player = self
            .store
            .member_state(room.owner, &room.name, client.id)
            .await?
            .unwrap_or_default();
        player.record_choice(round, choice);
        self.store
            .update_member_state(room.owner, &room.name, client.id, &player)
            .await?;
        tracing::debug!(room = %room, member = %client.id, round, choice, "choice recorded");

        let members = self.store.members(room.owner, &room.name).await?;

        let mut aggregate = 0u32;
        let mut all_chosen = true;
        for member in &members {
            if member.player.status.is_playing() {
                if member.player.choice == CHOICE_UNSET {
                    all_chosen = false;
                }
                aggregate |= member.player.choice;
            }
        }

        if !all_chosen {
            // Someone still has to vote; nothing more happens yet.
            return Ok(());
        }

        self.resolve_round(room, members, aggregate).await
    }

    /// Resolves a completed round. Runs under the choice lock held by
    /// `submit_choice`.
    async fn resolve_round(
        &self,
        room: &Room,
        mut members: Vec<Client>,
        aggregate: u32,
    ) -> Result<(), EngineError> {
        let mut state = self
            .store
            .room_state(room.owner, &room.name)
            .await?
            .unwrap_or_default();
        state.lifecycle = Lifecycle::ClosedAwaitingStart;
        self.store.update_room_state(room.owner, &room.name, &state).await?;

        let winner = winning_move(aggregate);
        let total_members = members.len();
        let mut playing_now = 0usize;
        let mut champion: Option<Client> = None;

        for member in &mut members {
            let prior_status = member.player.status;

            if prior_status.is_playing()
                && winner != CHOICE_UNSET
                && member.player.choice != winner
            {
                member.player.status = PlayerStatus::Watching;
                self.store
                    .update_member_state(room.owner, &room.name, member.id, &member.player)
                    .await?;
                self.store.add_loss(member.id).await?;
            }

            if member.player.status.is_playing() {
                playing_now += 1;
                champion = Some(member.clone());
            }

            self.updates.push(Update::RoundFinished {
                recipient: member.clone(),
                room: room.clone(),
                winning_move: winner,
                prior_status,
            });
        }
        tracing::info!(
            room = %room,
            round = state.round,
            winner,
            playing = playing_now,
            "round finished"
        );

        if playing_now <= 1 {
            // Games of one never existed: no win is credited unless
            // someone else actually played.
            if total_members > 1 {
                if let Some(champion) = champion {
                    self.store.add_win(champion.id).await?;
                    self.updates.push(Update::YouWin {
                        recipient: champion,
                        room: room.clone(),
                    });
                }
            }
            self.finish_session(room).await
        } else {
            // Tail-continuation: the next round starts inside the same
            // critical-section acquisition.
            self.next_round(room).await
        }
    }

    /// Tells the owner their session is over, with a token they can
    /// share to gather the next game.
    async fn finish_session(&self, room: &Room) -> Result<(), EngineError> {
        let owner = match self.store.user(room.owner).await? {
            Some(owner) => owner,
            // The owner row is FK-protected, but a snapshot can outlive
            // it; fall back to what the room remembers.
            None => Client::new(room.owner, room.owner_name.clone(), "en"),
        };
        let invite_token = self.invite_token(room).await?;
        self.updates.push(Update::SessionFinished {
            recipient: owner,
            room: room.clone(),
            invite_token,
        });
        tracing::info!(room = %room, "session finished");
        Ok(())
    }

    // -- invites ----------------------------------------------------------

    /// The shareable token for `room`, generated on first request and
    /// stable until regenerated.
    pub async fn invite_token(&self, room: &Room) -> Result<String, EngineError> {
        match self.store.invite_for_room(room.owner, &room.name).await? {
            Some(token) => Ok(token),
            None => crate::invite::generate(&self.store, room).await,
        }
    }
}
