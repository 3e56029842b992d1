use crate::errors::RoomError;
use crate::manager::Room;
use holdem_engine::player::PlayerId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Process-wide index of live rooms and of the room each player sits in.
///
/// Both maps are guarded independently of any room, so creating or purging
/// a room never waits on an action running in another one. Callers must not
/// hold a registry guard while locking a room; every method here releases
/// its guard before returning.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
    player_rooms: RwLock<HashMap<PlayerId, String>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a room under the first code `next_code` yields that is not
    /// already live. The check and the insert happen under one write guard.
    pub fn insert_unique<F, B>(&self, mut next_code: F, build: B) -> Result<Arc<Room>, RoomError>
    where
        F: FnMut() -> String,
        B: FnOnce(&str) -> Room,
    {
        let mut guard = self.rooms.write().map_err(|_| RoomError::StoragePoisoned)?;
        let code = loop {
            let candidate = next_code();
            if !guard.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!(room_code = %candidate, "room code collision, retrying");
        };
        let room = Arc::new(build(&code));
        guard.insert(code, Arc::clone(&room));
        Ok(room)
    }

    pub fn find(&self, code: &str) -> Result<Arc<Room>, RoomError> {
        let guard = self.rooms.read().map_err(|_| RoomError::StoragePoisoned)?;
        guard
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(code.to_string()))
    }

    pub fn remove(&self, code: &str) -> Result<Option<Arc<Room>>, RoomError> {
        let mut guard = self.rooms.write().map_err(|_| RoomError::StoragePoisoned)?;
        Ok(guard.remove(code))
    }

    pub fn route(&self, player_id: &str, code: &str) -> Result<(), RoomError> {
        let mut guard = self
            .player_rooms
            .write()
            .map_err(|_| RoomError::StoragePoisoned)?;
        guard.insert(player_id.to_string(), code.to_string());
        Ok(())
    }

    /// Drops the player's route, but only if it still points at `code`.
    pub fn unroute(&self, player_id: &str, code: &str) -> Result<(), RoomError> {
        let mut guard = self
            .player_rooms
            .write()
            .map_err(|_| RoomError::StoragePoisoned)?;
        if guard.get(player_id).is_some_and(|c| c == code) {
            guard.remove(player_id);
        }
        Ok(())
    }

    pub fn room_of(&self, player_id: &str) -> Result<Option<String>, RoomError> {
        let guard = self
            .player_rooms
            .read()
            .map_err(|_| RoomError::StoragePoisoned)?;
        Ok(guard.get(player_id).cloned())
    }

    pub fn codes(&self) -> Vec<String> {
        match self.rooms.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
