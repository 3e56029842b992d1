use holdem_engine::player::PlayerAction;
use holdem_rooms::logging::TestLogSubscriber;
use holdem_rooms::{ErrorKind, ErrorResponse, RoomError, RoomManager, RoomSettings};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

fn heads_up() -> (RoomManager, String) {
    let mgr = RoomManager::new(RoomSettings::default())
        .expect("default settings")
        .with_seed(11);
    let code = mgr.create_room("host", "Host").expect("create").room_code;
    mgr.join_room(&code, "guest", "Guest").expect("join");
    (mgr, code)
}

fn to_act(mgr: &RoomManager, code: &str) -> String {
    let state = mgr.get_full_state(code).expect("state");
    state.players[state.current_player_index].id.clone()
}

#[test]
fn room_errors_serialize_with_codes_and_details() {
    let (mgr, _) = heads_up();
    let err = mgr.join_room("QQQQQQ", "x", "X").expect_err("unknown room");
    assert_eq!(err.kind(), ErrorKind::RoomNotFound);

    let json = serde_json::to_value(err.to_error_response()).expect("serialize");
    assert_eq!(json["error"], "room_not_found");
    assert_eq!(json["message"], "Room not found");
    assert_eq!(json["details"]["room_code"], "QQQQQQ");

    let parsed: ErrorResponse = serde_json::from_value(json).expect("deserialize");
    assert_eq!(parsed.to_string(), "room_not_found: Room not found");
}

#[test]
fn lobby_rules_are_reported_by_kind() {
    let mgr = RoomManager::new(RoomSettings::default())
        .expect("default settings")
        .with_seed(12);
    let code = mgr.create_room("host", "Host").expect("create").room_code;

    let alone = mgr.start_game(&code, "host").expect_err("one player");
    assert_eq!(alone, RoomError::NotEnoughPlayers { minimum: 2 });
    assert_eq!(
        alone.to_error_response().details,
        Some(serde_json::json!({ "minimum": 2 }))
    );

    mgr.join_room(&code, "guest", "Guest").expect("join");
    assert_eq!(mgr.start_game(&code, "guest"), Err(RoomError::NotHost));
    mgr.start_game(&code, "host").expect("start");

    assert_eq!(
        mgr.join_room(&code, "late", "Late").map(|_| ()),
        Err(RoomError::GameInProgress)
    );
    assert_eq!(
        mgr.start_game(&code, "host"),
        Err(RoomError::GameInProgress)
    );
    assert_eq!(
        mgr.new_hand(&code, "host").map_err(|e| e.kind()),
        Err(ErrorKind::HandInProgress)
    );
    assert_eq!(
        mgr.handle_action(&code, "late", PlayerAction::Fold),
        Err(RoomError::PlayerNotInRoom)
    );
}

#[test]
fn betting_rejections_carry_engine_details() {
    let (mgr, code) = heads_up();
    assert_eq!(
        mgr.handle_action(&code, "host", PlayerAction::Check)
            .map_err(|e| e.kind()),
        Err(ErrorKind::NoHandInProgress)
    );
    mgr.start_game(&code, "host").expect("start");
    let actor = to_act(&mgr, &code);
    let waiting = if actor == "host" { "guest" } else { "host" };
    let before = mgr.get_full_state(&code).expect("state");

    let cases = [
        (waiting, PlayerAction::Call, "not_your_turn"),
        (actor.as_str(), PlayerAction::Check, "must_call_or_fold"),
        (
            actor.as_str(),
            PlayerAction::Raise { amount: Some(5) },
            "raise_too_small",
        ),
        (
            actor.as_str(),
            PlayerAction::Raise { amount: Some(5000) },
            "insufficient_chips",
        ),
    ];
    for (player, action, code_str) in cases {
        let err = mgr
            .handle_action(&code, player, action)
            .expect_err("rejected");
        assert_eq!(err.error_code(), code_str);
        assert!(!err.is_internal());
    }

    let small = mgr
        .handle_action(&code, &actor, PlayerAction::Raise { amount: Some(5) })
        .expect_err("rejected");
    assert_eq!(
        small.error_details(),
        Some(serde_json::json!({ "amount": 5, "minimum": 20 }))
    );
    let big = mgr
        .handle_action(&code, &actor, PlayerAction::Raise { amount: Some(5000) })
        .expect_err("rejected");
    assert_eq!(
        big.error_details(),
        Some(serde_json::json!({ "needed": 5010, "available": 990 }))
    );

    // rejections never touch the table
    let after = mgr.get_full_state(&code).expect("state");
    assert_eq!(before, after);
}

#[test]
fn manager_emits_structured_events() {
    let subscriber = TestLogSubscriber::new();
    let registry = Registry::default().with(subscriber.clone().into_layer::<Registry>());

    tracing::subscriber::with_default(registry, || {
        let (mgr, code) = heads_up();
        mgr.start_game(&code, "host").expect("start");
        let actor = to_act(&mgr, &code);
        mgr.handle_action(&code, &actor, PlayerAction::Fold)
            .expect("fold");

        let created = subscriber.find("room created");
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].field("room_code"), Some(code.as_str()));
        assert_eq!(created[0].field("host_id"), Some("host"));

        let complete = subscriber.find("hand complete");
        assert_eq!(complete.len(), 1);
        assert_eq!(complete[0].level, Level::INFO);
        assert_eq!(complete[0].field("pot"), Some("30"));
        assert!(subscriber.find("odd chips").is_empty());
    });
}
