use holdem_rooms::settings::{load_with_sources, SettingsError, ValueSource};
use holdem_rooms::RoomManager;
use serial_test::serial;
use std::io::Write;

const VARS: [&str; 5] = [
    "HOLDEM_CONFIG",
    "HOLDEM_STARTING_CHIPS",
    "HOLDEM_SMALL_BLIND",
    "HOLDEM_BIG_BLIND",
    "HOLDEM_MAX_PLAYERS",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("holdem.toml");
    let mut file = std::fs::File::create(&path).expect("create config");
    file.write_all(body.as_bytes()).expect("write config");
    path
}

#[test]
#[serial]
fn defaults_when_nothing_is_set() {
    clear_env();
    let resolved = load_with_sources().expect("load");
    assert_eq!(resolved.settings.starting_chips, 1000);
    assert_eq!(resolved.settings.small_blind, 10);
    assert_eq!(resolved.settings.big_blind, 20);
    assert_eq!(resolved.sources.big_blind, ValueSource::Default);
}

#[test]
#[serial]
fn file_then_env_precedence() {
    clear_env();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        &dir,
        "starting_chips = 500\nsmall_blind = 5\nbig_blind = 10\nhistory_limit = 3\n",
    );
    std::env::set_var("HOLDEM_CONFIG", &path);

    let from_file = load_with_sources().expect("load");
    assert_eq!(from_file.settings.starting_chips, 500);
    assert_eq!(from_file.sources.starting_chips, ValueSource::File);
    assert_eq!(from_file.settings.history_limit, 3);
    assert_eq!(from_file.sources.max_players, ValueSource::Default);

    std::env::set_var("HOLDEM_STARTING_CHIPS", "2500");
    std::env::set_var("HOLDEM_MAX_PLAYERS", " 6 ");
    let from_env = load_with_sources().expect("load");
    assert_eq!(from_env.settings.starting_chips, 2500);
    assert_eq!(from_env.sources.starting_chips, ValueSource::Env);
    assert_eq!(from_env.settings.max_players, 6);
    assert_eq!(from_env.settings.small_blind, 5);
    assert_eq!(from_env.sources.small_blind, ValueSource::File);

    clear_env();
}

#[test]
#[serial]
fn loaded_settings_reach_new_rooms() {
    clear_env();
    std::env::set_var("HOLDEM_STARTING_CHIPS", "300");
    std::env::set_var("HOLDEM_MAX_PLAYERS", "2");
    let settings = holdem_rooms::load_settings().expect("load");
    clear_env();

    let mgr = RoomManager::new(settings).expect("valid").with_seed(3);
    let state = mgr.create_room("a", "A").expect("create");
    assert_eq!(state.players[0].chips, 300);
    mgr.join_room(&state.room_code, "b", "B").expect("join");
    assert!(mgr.join_room(&state.room_code, "c", "C").is_err());
}

#[test]
#[serial]
fn malformed_env_value_is_rejected() {
    clear_env();
    std::env::set_var("HOLDEM_BIG_BLIND", "lots");
    let err = load_with_sources().expect_err("bad number");
    assert!(matches!(err, SettingsError::Invalid(_)));
    assert!(err.to_string().contains("HOLDEM_BIG_BLIND"));
    clear_env();
}

#[test]
#[serial]
fn invalid_combination_is_rejected_after_merging() {
    clear_env();
    std::env::set_var("HOLDEM_SMALL_BLIND", "50");
    // default big blind of 20 is now below the small blind
    assert!(matches!(load_with_sources(), Err(SettingsError::Invalid(_))));
    clear_env();
}

#[test]
#[serial]
fn stacks_too_large_for_a_full_table_are_rejected() {
    clear_env();
    std::env::set_var("HOLDEM_STARTING_CHIPS", "1000000000");
    let err = load_with_sources().expect_err("table chips overflow a pot");
    assert!(matches!(err, SettingsError::Invalid(_)));
    assert!(err.to_string().contains("starting_chips"));

    // the same stack fits once the table is small enough
    std::env::set_var("HOLDEM_MAX_PLAYERS", "4");
    let resolved = load_with_sources().expect("load");
    assert_eq!(resolved.settings.starting_chips, 1_000_000_000);
    clear_env();
}

#[test]
#[serial]
fn unreadable_and_unparsable_files() {
    clear_env();
    std::env::set_var("HOLDEM_CONFIG", "/nonexistent/holdem.toml");
    assert!(matches!(load_with_sources(), Err(SettingsError::Io(_))));

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, "big_blind = \"twenty\"\n");
    std::env::set_var("HOLDEM_CONFIG", &path);
    assert!(matches!(load_with_sources(), Err(SettingsError::Parse(_))));
    clear_env();
}
