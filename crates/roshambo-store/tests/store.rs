//! Integration tests for the store against an in-memory database.

use roshambo_model::{
    GameState, Identity, Lifecycle, PlayerState, RoomSettings, CHOICE_PAPER,
    CHOICE_STONE,
};
use roshambo_store::Store;

// -- Helpers ----------------------------------------------------------------

fn ann() -> Identity {
    Identity::new(1, 10)
}

fn bo() -> Identity {
    Identity::new(2, 20)
}

async fn store_with_users() -> Store {
    let store = Store::open_in_memory().await.unwrap();
    store
        .upsert_user(ann(), "ann", "en", "Ann", "A")
        .await
        .unwrap();
    store
        .upsert_user(bo(), "bo", "ru", "Bo", "B")
        .await
        .unwrap();
    store
}

/// Seeds a room owned by ann with both users as members.
async fn store_with_room() -> Store {
    let store = store_with_users().await;
    store.upsert_room(ann(), "den").await.unwrap();
    store.add_member(ann(), "den", ann()).await.unwrap();
    store.add_member(ann(), "den", bo()).await.unwrap();
    store
}

// -- Users ------------------------------------------------------------------

#[tokio::test]
async fn test_upsert_user_creates_then_refreshes_profile() {
    let store = Store::open_in_memory().await.unwrap();
    store
        .upsert_user(ann(), "ann", "en", "Ann", "A")
        .await
        .unwrap();
    store
        .upsert_user(ann(), "annie", "de", "Ann", "A")
        .await
        .unwrap();

    let client = store.user(ann()).await.unwrap().unwrap();
    assert_eq!(client.name, "annie");
    assert_eq!(client.locale, "de");
}

#[tokio::test]
async fn test_upsert_user_preserves_statistics() {
    let store = store_with_users().await;
    store.add_win(ann()).await.unwrap();
    store.add_loss(ann()).await.unwrap();

    // Re-contact must not reset the counters.
    store
        .upsert_user(ann(), "ann", "en", "Ann", "A")
        .await
        .unwrap();
    assert_eq!(store.user_stats(ann()).await.unwrap(), Some((2, 1)));
}

#[tokio::test]
async fn test_user_unknown_is_none_not_error() {
    let store = Store::open_in_memory().await.unwrap();
    assert!(store.user(Identity::new(5, 5)).await.unwrap().is_none());
    assert!(store
        .user_stats(Identity::new(5, 5))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_stats_counters_accumulate() {
    let store = store_with_users().await;
    store.add_loss(bo()).await.unwrap();
    store.add_loss(bo()).await.unwrap();
    store.add_win(bo()).await.unwrap();
    assert_eq!(store.user_stats(bo()).await.unwrap(), Some((3, 1)));
}

// -- Rooms ------------------------------------------------------------------

#[tokio::test]
async fn test_upsert_room_preserves_state_blob() {
    let store = store_with_users().await;
    store.upsert_room(ann(), "den").await.unwrap();

    let state = GameState {
        lifecycle: Lifecycle::Started,
        round: 3,
    };
    store.update_room_state(ann(), "den", &state).await.unwrap();

    // Second upsert only bumps last_used.
    store.upsert_room(ann(), "den").await.unwrap();
    assert_eq!(store.room_state(ann(), "den").await.unwrap(), Some(state));
}

#[tokio::test]
async fn test_room_state_unknown_room_is_none() {
    let store = store_with_users().await;
    assert!(store.room_state(ann(), "attic").await.unwrap().is_none());
}

#[tokio::test]
async fn test_room_blobs_fresh_room_decodes_defaults() {
    let store = store_with_users().await;
    store.upsert_room(ann(), "den").await.unwrap();
    let (settings, state) = store.room_blobs(ann(), "den").await.unwrap().unwrap();
    assert_eq!(settings, RoomSettings::default());
    assert_eq!(state, GameState::default());
}

#[tokio::test]
async fn test_room_settings_round_trip() {
    let store = store_with_users().await;
    store.upsert_room(ann(), "den").await.unwrap();

    let settings = RoomSettings::default();
    store
        .update_room_settings(ann(), "den", &settings)
        .await
        .unwrap();

    let loaded = store.room_settings(ann(), "den").await.unwrap().unwrap();
    assert_eq!(loaded, settings);
    assert!(store.room_settings(ann(), "attic").await.unwrap().is_none());
}

// -- Invites ----------------------------------------------------------------

#[tokio::test]
async fn test_replace_invite_keeps_one_live_token() {
    let store = store_with_users().await;
    store.upsert_room(ann(), "den").await.unwrap();

    store.replace_invite(ann(), "den", "tokenA").await.unwrap();
    store.replace_invite(ann(), "den", "tokenB").await.unwrap();

    assert_eq!(
        store.invite_for_room(ann(), "den").await.unwrap(),
        Some("tokenB".into())
    );
    assert!(!store.invite_exists("tokenA").await.unwrap());
    assert!(store.invite_exists("tokenB").await.unwrap());
}

#[tokio::test]
async fn test_room_by_invite_resolves_owner_and_name() {
    let store = store_with_users().await;
    store.upsert_room(ann(), "den").await.unwrap();
    store.replace_invite(ann(), "den", "tok").await.unwrap();

    let key = store.room_by_invite("tok").await.unwrap().unwrap();
    assert_eq!(key.owner, ann());
    assert_eq!(key.owner_name, "ann");
    assert_eq!(key.name, "den");

    assert!(store.room_by_invite("nope").await.unwrap().is_none());
}

// -- Memberships ------------------------------------------------------------

#[tokio::test]
async fn test_add_member_moves_member_between_rooms() {
    let store = store_with_room().await;
    store.upsert_room(bo(), "attic").await.unwrap();

    // bo joins their own room; the unique member pair replaces the
    // old row instead of adding a second membership.
    store.add_member(bo(), "attic", bo()).await.unwrap();

    let key = store.room_for_member(bo()).await.unwrap().unwrap();
    assert_eq!(key.owner, bo());
    assert_eq!(key.name, "attic");

    let den = store.members(ann(), "den").await.unwrap();
    assert!(!den.iter().any(|m| m.id == bo()));
}

#[tokio::test]
async fn test_members_ordered_by_name() {
    let store = store_with_room().await;
    let members = store.members(ann(), "den").await.unwrap();
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["ann", "bo"]);
}

#[tokio::test]
async fn test_member_state_round_trip() {
    let store = store_with_room().await;

    let mut state = PlayerState::default();
    state.record_choice(1, CHOICE_STONE);
    state.record_choice(2, CHOICE_PAPER);
    store
        .update_member_state(ann(), "den", bo(), &state)
        .await
        .unwrap();

    let loaded = store.member_state(ann(), "den", bo()).await.unwrap().unwrap();
    assert_eq!(loaded, state);
}

#[tokio::test]
async fn test_reset_member_states_restores_defaults() {
    let store = store_with_room().await;
    let mut state = PlayerState::default();
    state.record_choice(1, CHOICE_STONE);
    store
        .update_member_state(ann(), "den", ann(), &state)
        .await
        .unwrap();

    store.reset_member_states(ann(), "den").await.unwrap();

    let loaded = store.member_state(ann(), "den", ann()).await.unwrap().unwrap();
    assert_eq!(loaded, PlayerState::default());
}

#[tokio::test]
async fn test_clear_members_empties_room() {
    let store = store_with_room().await;
    store.clear_members(ann(), "den").await.unwrap();
    assert!(store.members(ann(), "den").await.unwrap().is_empty());
    assert!(store.room_for_member(bo()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_remove_member_leaves_others() {
    let store = store_with_room().await;
    store.remove_member(ann(), "den", bo()).await.unwrap();

    let members = store.members(ann(), "den").await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, ann());
}

// -- Cascades ---------------------------------------------------------------

#[tokio::test]
async fn test_remove_user_cascades_rooms_invites_memberships() {
    let store = store_with_room().await;
    store.replace_invite(ann(), "den", "tok").await.unwrap();

    store.remove_user(ann()).await.unwrap();

    assert!(store.room_state(ann(), "den").await.unwrap().is_none());
    assert!(!store.invite_exists("tok").await.unwrap());
    assert!(store.members(ann(), "den").await.unwrap().is_empty());
    // bo's membership row pointed at ann's room, so it cascades too.
    assert!(store.room_for_member(bo()).await.unwrap().is_none());
}
