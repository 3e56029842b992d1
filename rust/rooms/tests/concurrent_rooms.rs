/// Concurrent room testing for races between rooms and within one room
use holdem_engine::errors::GameError;
use holdem_engine::player::PlayerAction;
use holdem_rooms::{RoomError, RoomManager, RoomSettings};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;

fn manager() -> Arc<RoomManager> {
    Arc::new(
        RoomManager::new(RoomSettings::default())
            .expect("default settings")
            .with_seed(77),
    )
}

/// Plays one hand to the end with check/call only.
fn play_hand(mgr: &RoomManager, code: &str) {
    play_hand_with(mgr, code, |result| result.expect("legal action"));
}

fn play_hand_with<F>(mgr: &RoomManager, code: &str, mut on_result: F)
where
    F: FnMut(Result<(), RoomError>),
{
    loop {
        let state = mgr.get_full_state(code).expect("room exists");
        if !state.phase.is_betting() {
            return;
        }
        let actor = &state.players[state.current_player_index];
        let action = if actor.current_bet < state.current_bet {
            PlayerAction::Call
        } else {
            PlayerAction::Check
        };
        let id = actor.id.clone();
        on_result(mgr.handle_action(code, &id, action));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_room_creation() {
    let mgr = manager();
    let mut join_set = JoinSet::new();
    let room_count: usize = 50;

    for i in 0..room_count {
        let mgr = Arc::clone(&mgr);
        join_set.spawn_blocking(move || {
            mgr.create_room(&format!("host-{i}"), "Host")
                .expect("create room")
                .room_code
        });
    }

    let mut codes = Vec::new();
    while let Some(result) = join_set.join_next().await {
        codes.push(result.expect("task completed"));
    }

    let unique: HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), room_count);
    assert_eq!(mgr.room_count(), room_count);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_hands_in_different_rooms_run_independently() {
    let mgr = manager();
    let mut codes = Vec::new();
    for i in 0..8 {
        let code = mgr
            .create_room(&format!("h{i}"), "Host")
            .expect("create")
            .room_code;
        mgr.join_room(&code, &format!("g{i}"), "Guest")
            .expect("join");
        mgr.join_room(&code, &format!("x{i}"), "Extra")
            .expect("join");
        mgr.start_game(&code, &format!("h{i}")).expect("start");
        codes.push(code);
    }

    let mut join_set = JoinSet::new();
    for code in codes.clone() {
        let mgr = Arc::clone(&mgr);
        join_set.spawn_blocking(move || {
            play_hand(&mgr, &code);
            mgr.get_full_state(&code).expect("state")
        });
    }

    while let Some(result) = join_set.join_next().await {
        let state = result.expect("task completed");
        assert!(state.phase.is_hand_over());
        let chips: u32 = state.players.iter().map(|p| p.chips).sum();
        assert_eq!(chips + state.remainder, 3000);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_actions_in_one_room_apply_once() {
    let mgr = manager();
    let code = mgr.create_room("a", "A").expect("create").room_code;
    mgr.join_room(&code, "b", "B").expect("join");
    mgr.join_room(&code, "c", "C").expect("join");
    mgr.start_game(&code, "a").expect("start");

    let state = mgr.get_full_state(&code).expect("state");
    let actor = state.players[state.current_player_index].id.clone();
    let pot_before = state.pot;

    // the same call submitted many times: exactly one may land
    let mut join_set = JoinSet::new();
    for _ in 0..16 {
        let mgr = Arc::clone(&mgr);
        let code = code.clone();
        let actor = actor.clone();
        join_set.spawn_blocking(move || mgr.handle_action(&code, &actor, PlayerAction::Call));
    }

    let mut accepted = 0;
    while let Some(result) = join_set.join_next().await {
        match result.expect("task completed") {
            Ok(()) => accepted += 1,
            Err(err) => assert_eq!(err, RoomError::Game(GameError::NotYourTurn)),
        }
    }
    assert_eq!(accepted, 1);
    let state = mgr.get_full_state(&code).expect("state");
    assert_eq!(state.pot, pot_before + 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disconnects_race_with_actions() {
    let mgr = manager();
    let code = mgr.create_room("a", "A").expect("create").room_code;
    for id in ["b", "c", "d"] {
        mgr.join_room(&code, id, id).expect("join");
    }
    mgr.start_game(&code, "a").expect("start");

    let mut join_set = JoinSet::new();
    for id in ["b", "c"] {
        let mgr = Arc::clone(&mgr);
        join_set.spawn_blocking(move || {
            mgr.player_disconnected(id).expect("disconnect");
        });
    }
    {
        let mgr = Arc::clone(&mgr);
        let code = code.clone();
        // a disconnect can fold the actor between our read and our action
        join_set.spawn_blocking(move || {
            play_hand_with(&mgr, &code, |result| {
                if let Err(err) = result {
                    assert_eq!(err.error_code(), "not_your_turn");
                }
            })
        });
    }
    while let Some(result) = join_set.join_next().await {
        result.expect("task completed");
    }

    play_hand(&mgr, &code);
    let state = mgr.get_full_state(&code).expect("state");
    assert!(state.phase.is_hand_over());
    for id in ["b", "c"] {
        let p = state.player(id).expect("seat kept");
        assert!(p.folded && !p.connected);
    }
    let chips: u32 = state.players.iter().map(|p| p.chips).sum();
    assert_eq!(chips + state.remainder, 4000);
}
