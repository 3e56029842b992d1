use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::player::{ActionKind, Player, PlayerId};

/// Room phases. `Showdown` and `Ended` close a hand; the room itself lives
/// on and re-enters `Preflop` for the next one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    /// Everyone but one player folded
    Ended,
}

impl Phase {
    /// Preflop through river.
    pub fn is_betting(self) -> bool {
        matches!(
            self,
            Phase::Preflop | Phase::Flop | Phase::Turn | Phase::River
        )
    }

    pub fn is_hand_over(self) -> bool {
        matches!(self, Phase::Showdown | Phase::Ended)
    }
}

/// Feedback about the most recent accepted action.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LastAction {
    pub player_id: PlayerId,
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub player_id: PlayerId,
    pub amount: u32,
    pub hand_description: String,
}

/// The per-room data model pushed to clients (after redaction).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub room_code: String,
    pub phase: Phase,
    /// Seating order is turn order
    pub players: Vec<Player>,
    pub dealer_index: usize,
    pub current_player_index: usize,
    pub community_cards: Vec<Card>,
    pub pot: u32,
    /// Highest commitment this betting round
    pub current_bet: u32,
    pub min_raise: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub last_action: Option<LastAction>,
    pub winners: Vec<Winner>,
    /// Odd chips an even split could not award; dropped when the next hand starts
    pub remainder: u32,
}

impl GameState {
    pub fn new(room_code: impl Into<String>, small_blind: u32, big_blind: u32) -> Self {
        Self {
            room_code: room_code.into(),
            phase: Phase::Waiting,
            players: Vec::new(),
            dealer_index: 0,
            current_player_index: 0,
            community_cards: Vec::with_capacity(5),
            pot: 0,
            current_bet: 0,
            min_raise: big_blind,
            small_blind,
            big_blind,
            last_action: None,
            winners: Vec::new(),
            remainder: 0,
        }
    }

    pub fn player_index(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// First seat at or after `start` (wrapping) whose player can still act.
    pub fn next_actor_from(&self, start: usize) -> Option<usize> {
        let n = self.players.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&i| self.players[i].can_act())
    }

    /// Re-derives every `is_current_turn` flag from `current_player_index`.
    /// Called at the end of every mutation so the two never drift apart.
    pub fn recompute_turn_flags(&mut self) {
        let current = self.current_player_index;
        let betting = self.phase.is_betting();
        for (i, p) in self.players.iter_mut().enumerate() {
            p.is_current_turn = betting && i == current && p.can_act();
        }
    }

    /// Copy of the state as seen by `viewer`: every other player's hole
    /// cards are removed.
    pub fn player_view(&self, viewer: &str) -> GameState {
        let mut view = self.clone();
        for p in view.players.iter_mut().filter(|p| p.id != viewer) {
            p.hole_cards.clear();
        }
        view
    }
}
