//! # holdem-rooms: Room/Session Manager
//!
//! Keeps every live Hold'em room in a process-wide [`registry::RoomRegistry`]
//! and applies inbound requests (create, join, start, act, new hand,
//! disconnect) to the right room's engine. Requests against one room are
//! serialized; different rooms proceed in parallel.
//!
//! ```rust
//! use holdem_engine::player::PlayerAction;
//! use holdem_rooms::manager::RoomManager;
//! use holdem_rooms::settings::RoomSettings;
//!
//! let manager = RoomManager::new(RoomSettings::default()).expect("valid settings");
//! let code = manager.create_room("alice", "Alice").expect("created").room_code;
//! manager.join_room(&code, "bob", "Bob").expect("joined");
//! manager.start_game(&code, "alice").expect("started");
//!
//! for id in manager.room_players(&code).expect("room exists") {
//!     let view = manager.get_player_view(&code, &id).expect("seated");
//!     assert_eq!(view.players.iter().filter(|p| !p.hole_cards.is_empty()).count(), 1);
//! }
//! let state = manager.get_full_state(&code).expect("room exists");
//! let to_act = state.players[state.current_player_index].id.clone();
//! manager.handle_action(&code, &to_act, PlayerAction::Fold).expect("legal fold");
//! ```

pub mod code;
pub mod errors;
pub mod logging;
pub mod manager;
pub mod registry;
pub mod settings;

pub use errors::{ErrorKind, ErrorResponse, RoomError};
pub use manager::{Disconnect, Room, RoomManager};
pub use registry::RoomRegistry;
pub use settings::{load_settings, RoomSettings};
