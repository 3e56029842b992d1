use crate::cards::Card;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable connection identity supplied by the transport.
pub type PlayerId = String;

/// Chips every seat receives when it joins a room.
pub const STARTING_CHIPS: u32 = 1_000;

/// Represents a player action during a betting round.
/// Only `Raise` carries an amount: the increment over the current bet,
/// defaulting to the minimum raise when absent.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Check (no bet, only valid if nothing is owed)
    Check,
    /// Match the current bet
    Call,
    /// Raise the current bet by `amount`
    Raise {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<u32>,
    },
    /// Commit every remaining chip
    AllIn,
}

impl PlayerAction {
    pub fn raise(amount: u32) -> Self {
        PlayerAction::Raise {
            amount: Some(amount),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            PlayerAction::Fold => ActionKind::Fold,
            PlayerAction::Check => ActionKind::Check,
            PlayerAction::Call => ActionKind::Call,
            PlayerAction::Raise { .. } => ActionKind::Raise,
            PlayerAction::AllIn => ActionKind::AllIn,
        }
    }
}

/// Payload-free action tag used for feedback and history.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Raise => "raise",
            ActionKind::AllIn => "all_in",
        };
        f.write_str(repr)
    }
}

/// A seated player. Owned by exactly one room for the room's lifetime;
/// the chip balance carries over from hand to hand.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub chips: u32,
    /// Empty, or exactly two cards while dealt in
    pub hole_cards: Vec<Card>,
    /// Chips committed during the current betting round
    pub current_bet: u32,
    pub folded: bool,
    pub all_in: bool,
    pub is_dealer: bool,
    /// Derived from the table's current player index, never set directly
    pub is_current_turn: bool,
    pub connected: bool,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, chips: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            chips,
            hole_cards: Vec::new(),
            current_bet: 0,
            folded: false,
            all_in: false,
            is_dealer: false,
            is_current_turn: false,
            connected: true,
        }
    }

    /// Still holding cards and chips, so the player can be asked to act.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }

    /// Moves up to `amount` chips from the stack into the current bet and
    /// returns what was actually committed. Emptying the stack means all-in.
    pub fn commit(&mut self, amount: u32) -> u32 {
        let committed = amount.min(self.chips);
        self.chips -= committed;
        self.current_bet += committed;
        if self.chips == 0 {
            self.all_in = true;
        }
        committed
    }

    pub fn add_chips(&mut self, amount: u32) {
        self.chips = self.chips.saturating_add(amount);
    }

    pub(crate) fn reset_for_hand(&mut self) {
        self.hole_cards.clear();
        self.current_bet = 0;
        self.folded = false;
        self.all_in = false;
        self.is_current_turn = false;
    }
}
