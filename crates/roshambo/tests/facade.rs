//! Smoke test: a whole game played through the facade's public
//! surface alone.

use roshambo::prelude::*;
use roshambo::{ClientStatus, Lifecycle};

#[tokio::test]
async fn test_full_game_through_facade() {
    let (pool, mut updates) = Roshambo::builder()
        .queue_capacity(64)
        .build()
        .await
        .unwrap();

    let mut ann = pool
        .actor(Identity::new(1, 100), "ann", "Ann", "", "en")
        .await
        .unwrap()
        .client;
    let mut bo = pool
        .actor(Identity::new(2, 100), "bo", "Bo", "", "ru")
        .await
        .unwrap()
        .client;

    let room = pool.join_own_room(&mut ann, "den").await.unwrap();
    let token = pool.invite_token(&room).await.unwrap();
    pool.join_by_token(&mut bo, &token).await.unwrap();
    assert_eq!(bo.status, ClientStatus::Authorized);

    pool.close_room(&room).await.unwrap();
    pool.submit_choice(&ann, &room, 1, CHOICE_SCISSORS).await.unwrap();
    pool.submit_choice(&bo, &room, 1, CHOICE_PAPER).await.unwrap();

    // Drain everything the game produced and spot-check the story.
    let mut saw_win_for_ann = false;
    let mut saw_session_finished = false;
    while let Ok(update) = updates.try_recv() {
        match update {
            Update::YouWin { recipient, .. } => {
                assert_eq!(recipient.id, ann.id);
                saw_win_for_ann = true;
            }
            Update::SessionFinished { recipient, invite_token, .. } => {
                assert_eq!(recipient.id, ann.id);
                assert!(!invite_token.is_empty());
                saw_session_finished = true;
            }
            _ => {}
        }
    }
    assert!(saw_win_for_ann);
    assert!(saw_session_finished);

    assert_eq!(pool.stats(ann.id).await.unwrap(), Some((1, 1)));
    assert_eq!(pool.stats(bo.id).await.unwrap(), Some((1, 0)));

    // The room waits for a restart rather than reopening for joins.
    let state = pool
        .store()
        .room_state(room.owner, &room.name)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.lifecycle, Lifecycle::ClosedAwaitingStart);
}
