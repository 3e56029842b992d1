use crate::code::{generate_code, is_valid_code, normalize_code};
use crate::errors::RoomError;
use crate::registry::RoomRegistry;
use crate::settings::{RoomSettings, SettingsError};
use holdem_engine::engine::Engine;
use holdem_engine::errors::GameError;
use holdem_engine::game::{GameState, Phase};
use holdem_engine::logger::{HandLogger, HandRecord};
use holdem_engine::player::{Player, PlayerAction, PlayerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// One table: the host and the engine that serializes every mutation.
#[derive(Debug)]
pub struct Room {
    code: String,
    host_id: PlayerId,
    engine: Mutex<Engine>,
    /// Set under the engine lock right before the room leaves the registry
    closed: AtomicBool,
}

impl Room {
    pub fn new(host_id: impl Into<PlayerId>, engine: Engine) -> Self {
        Self {
            code: engine.state().room_code.clone(),
            host_id: host_id.into(),
            engine: Mutex::new(engine),
            closed: AtomicBool::new(false),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    /// Exclusive access to the engine. A purged room behaves as if it was
    /// never found, even for callers that looked it up before the purge.
    fn lock(&self) -> Result<MutexGuard<'_, Engine>, RoomError> {
        let guard = self.engine.lock().map_err(|_| RoomError::StoragePoisoned)?;
        if self.closed.load(Ordering::Acquire) {
            return Err(RoomError::RoomNotFound(self.code.clone()));
        }
        Ok(guard)
    }
}

/// Result of a disconnect, so the transport knows whom to notify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnect {
    pub room_code: String,
    /// Every seat was disconnected and the room was purged
    pub room_closed: bool,
}

/// Owns every live room and applies the inbound operations to them.
///
/// Each room is its own unit of mutual exclusion; operations against
/// different rooms run in parallel. The manager never pushes: after a
/// successful call the transport pulls [`RoomManager::get_player_view`] for
/// each id in [`RoomManager::room_players`].
#[derive(Debug)]
pub struct RoomManager {
    registry: Arc<RoomRegistry>,
    settings: RoomSettings,
    rng: Mutex<StdRng>,
    hand_log: Option<Mutex<HandLogger>>,
}

impl RoomManager {
    pub fn new(settings: RoomSettings) -> Result<Self, SettingsError> {
        Self::with_registry(settings, Arc::new(RoomRegistry::new()))
    }

    pub fn with_registry(
        settings: RoomSettings,
        registry: Arc<RoomRegistry>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            registry,
            settings,
            rng: Mutex::new(StdRng::seed_from_u64(rand::random())),
            hand_log: None,
        })
    }

    /// Makes room codes and every room's shuffles reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Appends every finished hand to a JSONL file at `path`.
    pub fn with_hand_log<P: AsRef<Path>>(mut self, path: P) -> std::io::Result<Self> {
        self.hand_log = Some(Mutex::new(HandLogger::create(path)?));
        Ok(self)
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn registry(&self) -> Arc<RoomRegistry> {
        Arc::clone(&self.registry)
    }

    /// Looks a room up by user-supplied code, in any case. Malformed codes
    /// never reach the registry.
    fn room(&self, room_code: &str) -> Result<(String, Arc<Room>), RoomError> {
        let code = normalize_code(room_code);
        if !is_valid_code(&code) {
            return Err(RoomError::RoomNotFound(code));
        }
        let room = self.registry.find(&code)?;
        Ok((code, room))
    }

    pub fn create_room(&self, host_id: &str, host_name: &str) -> Result<GameState, RoomError> {
        let settings = &self.settings;
        let room = {
            let mut guard = self.rng.lock().map_err(|_| RoomError::StoragePoisoned)?;
            let rng = &mut *guard;
            let seed: u64 = rng.random();
            self.registry.insert_unique(
                || generate_code(&mut *rng),
                |code| {
                    let mut engine = Engine::new(code, settings.small_blind, settings.big_blind)
                        .with_seed(seed)
                        .with_min_players(settings.min_players)
                        .with_history_limit(settings.history_limit);
                    engine.seat(Player::new(host_id, host_name, settings.starting_chips));
                    Room::new(host_id, engine)
                },
            )?
        };

        let engine = room.lock()?;
        self.registry.route(host_id, room.code())?;
        tracing::info!(
            room_code = %room.code(),
            host_id = %host_id,
            "room created"
        );
        Ok(engine.view(host_id))
    }

    pub fn join_room(
        &self,
        room_code: &str,
        player_id: &str,
        player_name: &str,
    ) -> Result<GameState, RoomError> {
        let (code, room) = self.room(room_code)?;
        let mut engine = room.lock()?;

        if engine.state().phase != Phase::Waiting {
            return Err(RoomError::GameInProgress);
        }
        let seated = engine.state().players.len();
        if seated >= self.settings.max_players {
            return Err(RoomError::RoomFull {
                max: self.settings.max_players,
            });
        }
        if !engine.is_seated(player_id) {
            engine.seat(Player::new(player_id, player_name, self.settings.starting_chips));
            tracing::info!(
                room_code = %code,
                player_id = %player_id,
                seats = seated + 1,
                "player joined room"
            );
        }
        self.registry.route(player_id, &code)?;
        Ok(engine.view(player_id))
    }

    pub fn start_game(&self, room_code: &str, player_id: &str) -> Result<(), RoomError> {
        let (code, room) = self.room(room_code)?;
        let mut engine = room.lock()?;

        if room.host_id() != player_id {
            return Err(RoomError::NotHost);
        }
        if engine.state().players.len() < self.settings.min_players {
            return Err(RoomError::NotEnoughPlayers {
                minimum: self.settings.min_players,
            });
        }
        if engine.state().phase != Phase::Waiting {
            return Err(RoomError::GameInProgress);
        }

        let previous = last_hand_id(&engine);
        engine.start_hand()?;
        tracing::info!(
            room_code = %code,
            players = engine.state().players.len(),
            hand_id = engine.hand_id().unwrap_or_default(),
            "game started"
        );
        self.report_finished(&engine, previous);
        Ok(())
    }

    pub fn handle_action(
        &self,
        room_code: &str,
        player_id: &str,
        action: PlayerAction,
    ) -> Result<(), RoomError> {
        let (code, room) = self.room(room_code)?;
        let mut engine = room.lock()?;
        if !engine.is_seated(player_id) {
            return Err(RoomError::PlayerNotInRoom);
        }

        let previous = last_hand_id(&engine);
        let phase = engine.state().phase;
        if let Err(err) = engine.apply_action(player_id, action) {
            let err = RoomError::from(err);
            tracing::debug!(
                room_code = %code,
                player_id = %player_id,
                action = ?action,
                error = err.error_code(),
                "action rejected"
            );
            return Err(err);
        }
        tracing::debug!(
            room_code = %code,
            player_id = %player_id,
            action = ?action,
            phase = ?phase,
            next_phase = ?engine.state().phase,
            pot = engine.state().pot,
            "action applied"
        );
        self.report_finished(&engine, previous);
        Ok(())
    }

    /// Deals the next hand once the previous one reached showdown or ended.
    pub fn new_hand(&self, room_code: &str, player_id: &str) -> Result<(), RoomError> {
        let (code, room) = self.room(room_code)?;
        let mut engine = room.lock()?;
        if !engine.is_seated(player_id) {
            return Err(RoomError::PlayerNotInRoom);
        }
        match engine.state().phase {
            Phase::Showdown | Phase::Ended => {}
            Phase::Waiting => return Err(GameError::NoHandInProgress.into()),
            _ => return Err(GameError::HandInProgress.into()),
        }

        let previous = last_hand_id(&engine);
        engine.start_hand()?;
        tracing::info!(
            room_code = %code,
            hand_id = engine.hand_id().unwrap_or_default(),
            dealer_index = engine.state().dealer_index,
            "new hand started"
        );
        self.report_finished(&engine, previous);
        Ok(())
    }

    /// Marks the player disconnected, folding them out of a running hand.
    /// Returns `None` when the player is not routed to any live room.
    pub fn player_disconnected(&self, player_id: &str) -> Result<Option<Disconnect>, RoomError> {
        let Some(code) = self.registry.room_of(player_id)? else {
            return Ok(None);
        };
        let room = match self.registry.find(&code) {
            Ok(room) => room,
            Err(RoomError::RoomNotFound(_)) => {
                self.registry.unroute(player_id, &code)?;
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let mut engine = match room.lock() {
            Ok(engine) => engine,
            Err(RoomError::RoomNotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };
        if !engine.is_seated(player_id) {
            self.registry.unroute(player_id, &code)?;
            return Ok(None);
        }

        let previous = last_hand_id(&engine);
        engine.set_connected(player_id, false)?;
        tracing::info!(
            room_code = %code,
            player_id = %player_id,
            phase = ?engine.state().phase,
            "player disconnected"
        );
        self.report_finished(&engine, previous);

        let room_closed = engine.state().players.iter().all(|p| !p.connected);
        if room_closed {
            room.closed.store(true, Ordering::Release);
            self.registry.remove(&code)?;
            for p in &engine.state().players {
                self.registry.unroute(&p.id, &code)?;
            }
            tracing::info!(room_code = %code, "all players disconnected, room closed");
        }
        Ok(Some(Disconnect {
            room_code: code,
            room_closed,
        }))
    }

    pub fn player_reconnected(
        &self,
        player_id: &str,
        room_code: &str,
    ) -> Result<GameState, RoomError> {
        let (code, room) = self.room(room_code)?;
        let mut engine = room.lock()?;
        if !engine.is_seated(player_id) {
            return Err(RoomError::PlayerNotInRoom);
        }
        engine.set_connected(player_id, true)?;
        self.registry.route(player_id, &code)?;
        tracing::info!(
            room_code = %code,
            player_id = %player_id,
            "player reconnected"
        );
        Ok(engine.view(player_id))
    }

    /// The room as `player_id` may see it: other hole cards are removed.
    pub fn get_player_view(
        &self,
        room_code: &str,
        player_id: &str,
    ) -> Result<GameState, RoomError> {
        let (_, room) = self.room(room_code)?;
        let engine = room.lock()?;
        if !engine.is_seated(player_id) {
            return Err(RoomError::PlayerNotInRoom);
        }
        Ok(engine.view(player_id))
    }

    /// Unredacted state. Never send this to a client.
    pub fn get_full_state(&self, room_code: &str) -> Result<GameState, RoomError> {
        let (_, room) = self.room(room_code)?;
        let engine = room.lock()?;
        Ok(engine.state().clone())
    }

    pub fn room_players(&self, room_code: &str) -> Result<Vec<PlayerId>, RoomError> {
        let (_, room) = self.room(room_code)?;
        let engine = room.lock()?;
        let players = &engine.state().players;
        Ok(players.iter().map(|p| p.id.clone()).collect())
    }

    /// Finished hands of the room, oldest first.
    pub fn hand_history(&self, room_code: &str) -> Result<Vec<HandRecord>, RoomError> {
        let (_, room) = self.room(room_code)?;
        let engine = room.lock()?;
        Ok(engine.history().iter().cloned().collect())
    }

    pub fn active_rooms(&self) -> Vec<String> {
        self.registry.codes()
    }

    pub fn room_count(&self) -> usize {
        self.registry.len()
    }

    /// Logs (and appends to the hand log) a hand that finished during the
    /// last mutation, detected by a new record at the end of the history.
    fn report_finished(&self, engine: &Engine, previous: Option<String>) {
        let Some(record) = engine.history().back() else {
            return;
        };
        if previous.as_deref() == Some(record.hand_id.as_str()) {
            return;
        }

        let winners: Vec<&str> = record
            .winners
            .iter()
            .map(|w| w.player_id.as_str())
            .collect();
        tracing::info!(
            room_code = %record.room_code,
            hand_id = %record.hand_id,
            pot = record.pot,
            winners = ?winners,
            "hand complete"
        );
        if record.remainder > 0 {
            tracing::warn!(
                room_code = %record.room_code,
                hand_id = %record.hand_id,
                remainder = record.remainder,
                "split pot left odd chips unawarded"
            );
        }

        if let Some(log) = &self.hand_log {
            match log.lock() {
                Ok(mut logger) => {
                    if let Err(err) = logger.write(record) {
                        tracing::error!(
                            hand_id = %record.hand_id,
                            error = %err,
                            "failed to append hand record"
                        );
                    }
                }
                Err(_) => tracing::error!("hand log poisoned"),
            }
        }
    }
}

fn last_hand_id(engine: &Engine) -> Option<String> {
    engine.history().back().map(|r| r.hand_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn manager() -> RoomManager {
        RoomManager::new(RoomSettings::default())
            .expect("default settings")
            .with_seed(42)
    }

    #[test]
    fn creates_room_with_host_seated() {
        let mgr = manager();
        let view = mgr.create_room("host", "Hana").expect("create");
        assert!(is_valid_code(&view.room_code));
        assert_eq!(view.phase, Phase::Waiting);
        assert_eq!(view.players.len(), 1);
        assert_eq!(view.players[0].chips, 1000);
        assert!(view.players[0].is_dealer);
        assert_eq!(mgr.room_count(), 1);
        assert_eq!(mgr.registry().room_of("host"), Ok(Some(view.room_code)));
    }

    #[test]
    fn join_is_case_insensitive_and_idempotent() {
        let mgr = manager();
        let code = mgr.create_room("host", "Hana").expect("create").room_code;
        mgr.join_room(&code.to_lowercase(), "p2", "Pia")
            .expect("join");
        let view = mgr.join_room(&code, "p2", "Pia").expect("rejoin");
        assert_eq!(view.players.len(), 2);
    }

    #[test]
    fn unknown_room_is_not_found() {
        let mgr = manager();
        let err = mgr.join_room("ZZZZZZ", "p1", "P").expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::RoomNotFound);
    }

    #[test]
    fn malformed_codes_are_not_found() {
        let mgr = manager();
        mgr.create_room("host", "Hana").expect("create");
        assert_eq!(
            mgr.get_full_state(" ab1 ").map(|_| ()),
            Err(RoomError::RoomNotFound("AB1".into()))
        );
        assert_eq!(
            mgr.join_room("ABCDEFG", "p1", "P").map(|_| ()),
            Err(RoomError::RoomNotFound("ABCDEFG".into()))
        );
    }

    #[test]
    fn only_host_can_start_with_enough_players() {
        let mgr = manager();
        let code = mgr.create_room("host", "Hana").expect("create").room_code;
        assert_eq!(
            mgr.start_game(&code, "host"),
            Err(RoomError::NotEnoughPlayers { minimum: 2 })
        );
        mgr.join_room(&code, "p2", "Pia").expect("join");
        assert_eq!(mgr.start_game(&code, "p2"), Err(RoomError::NotHost));
        mgr.start_game(&code, "host").expect("start");
        assert_eq!(
            mgr.start_game(&code, "host"),
            Err(RoomError::GameInProgress)
        );
        assert_eq!(
            mgr.join_room(&code, "p3", "Pat").map(|_| ()),
            Err(RoomError::GameInProgress)
        );
    }

    #[test]
    fn actions_from_strangers_are_rejected() {
        let mgr = manager();
        let code = mgr.create_room("host", "Hana").expect("create").room_code;
        mgr.join_room(&code, "p2", "Pia").expect("join");
        mgr.start_game(&code, "host").expect("start");
        assert_eq!(
            mgr.handle_action(&code, "ghost", PlayerAction::Fold),
            Err(RoomError::PlayerNotInRoom)
        );
        assert_eq!(
            mgr.get_player_view(&code, "ghost").map(|_| ()),
            Err(RoomError::PlayerNotInRoom)
        );
    }

    #[test]
    fn new_hand_requires_a_finished_hand() {
        let mgr = manager();
        let code = mgr.create_room("host", "Hana").expect("create").room_code;
        mgr.join_room(&code, "p2", "Pia").expect("join");
        assert_eq!(
            mgr.new_hand(&code, "host"),
            Err(RoomError::Game(GameError::NoHandInProgress))
        );
        mgr.start_game(&code, "host").expect("start");
        assert_eq!(
            mgr.new_hand(&code, "host"),
            Err(RoomError::Game(GameError::HandInProgress))
        );
    }

    #[test]
    fn invalid_settings_are_refused() {
        let settings = RoomSettings {
            max_players: 12,
            ..RoomSettings::default()
        };
        assert!(RoomManager::new(settings).is_err());
    }
}
