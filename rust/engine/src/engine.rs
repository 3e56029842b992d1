use std::collections::{HashSet, VecDeque};

use chrono::{SecondsFormat, Utc};

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::{GameState, LastAction, Phase, Winner};
use crate::hand::{compare_hands, evaluate_hand};
use crate::logger::{format_hand_id, ActionRecord, HandRecord};
use crate::player::{ActionKind, Player, PlayerAction, PlayerId};
use crate::rules::{validate_action, ValidatedAction};

/// Finished hands kept per room unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// The betting state machine of one room.
///
/// Owns the room's [`GameState`], its private [`Deck`] and the set of players
/// who have acted in the current betting round. Every mutating method either
/// fails without touching anything or applies completely, and finishes by
/// re-deriving the turn flags.
///
/// # Examples
///
/// ```
/// use holdem_engine::engine::Engine;
/// use holdem_engine::game::Phase;
/// use holdem_engine::player::{Player, PlayerAction};
///
/// let mut engine = Engine::new("ROOM42", 10, 20).with_seed(7);
/// engine.seat(Player::new("ann", "Ann", 1000));
/// engine.seat(Player::new("bob", "Bob", 1000));
/// engine.start_hand().expect("two players are seated");
/// assert_eq!(engine.state().phase, Phase::Preflop);
///
/// let first = engine.state().players[engine.state().current_player_index].id.clone();
/// engine.apply_action(&first, PlayerAction::Fold).expect("first player may fold");
/// assert_eq!(engine.state().phase, Phase::Ended);
/// ```
#[derive(Debug)]
pub struct Engine {
    state: GameState,
    deck: Deck,
    /// Players who acted since the betting round opened or was last reopened
    acted: HashSet<PlayerId>,
    min_players: usize,
    hand_seq: u32,
    hand_id: Option<String>,
    actions: Vec<ActionRecord>,
    history: VecDeque<HandRecord>,
    history_limit: usize,
}

impl Engine {
    pub fn new(room_code: impl Into<String>, small_blind: u32, big_blind: u32) -> Self {
        Self {
            state: GameState::new(room_code, small_blind, big_blind),
            deck: Deck::new(),
            acted: HashSet::new(),
            min_players: 2,
            hand_seq: 0,
            hand_id: None,
            actions: Vec::new(),
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.deck = Deck::new_with_seed(seed);
        self
    }

    pub fn with_min_players(mut self, min_players: usize) -> Self {
        self.min_players = min_players.max(2);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Unredacted state, for server-side bookkeeping only.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn view(&self, viewer: &str) -> GameState {
        self.state.player_view(viewer)
    }

    pub fn acted(&self) -> &HashSet<PlayerId> {
        &self.acted
    }

    pub fn hand_id(&self) -> Option<&str> {
        self.hand_id.as_deref()
    }

    /// Finished hands, oldest first.
    pub fn history(&self) -> &VecDeque<HandRecord> {
        &self.history
    }

    pub fn is_seated(&self, player_id: &str) -> bool {
        self.state.player_index(player_id).is_some()
    }

    /// Appends a seat. Capacity and phase checks belong to the caller, as does
    /// keeping the table's chip total within `u32` so the pot cannot overflow.
    pub fn seat(&mut self, mut player: Player) {
        player.is_dealer = self.state.players.is_empty();
        self.state.players.push(player);
        self.state.recompute_turn_flags();
    }

    /// Orders the top of the deck for the next hand (seat order, two cards
    /// each, then flop, turn and river).
    #[doc(hidden)]
    pub fn stack_deck(&mut self, cards: Vec<Card>) {
        self.deck.stack(cards);
    }

    /// Starts the next hand: rotates the dealer, posts blinds, deals hole
    /// cards and hands the turn to the seat after the big blind.
    ///
    /// Seats without chips or without a connection sit the hand out.
    pub fn start_hand(&mut self) -> Result<(), GameError> {
        if self.state.phase.is_betting() {
            return Err(GameError::HandInProgress);
        }
        let dealt_in = self
            .state
            .players
            .iter()
            .filter(|p| p.connected && p.chips > 0)
            .count();
        if dealt_in < self.min_players {
            return Err(GameError::NotEnoughPlayers {
                minimum: self.min_players,
            });
        }

        self.deck.reset();
        self.acted.clear();
        self.actions.clear();
        let state = &mut self.state;
        state.community_cards.clear();
        state.pot = 0;
        state.current_bet = 0;
        state.winners.clear();
        state.last_action = None;
        state.remainder = 0;
        for p in state.players.iter_mut() {
            p.reset_for_hand();
            if !p.connected || p.chips == 0 {
                p.folded = true;
            }
        }

        let n = state.players.len();
        state.dealer_index = (state.dealer_index + 1) % n;
        let dealer = state.dealer_index;
        for (i, p) in state.players.iter_mut().enumerate() {
            p.is_dealer = i == dealer;
        }

        let sb = self.next_dealt_in(dealer + 1);
        let bb = self.next_dealt_in(sb + 1);
        let (small, big) = (self.state.small_blind, self.state.big_blind);
        self.post_blind(sb, small);
        self.post_blind(bb, big);
        self.state.current_bet = big;
        self.state.min_raise = big;

        for i in 0..n {
            if !self.state.players[i].folded {
                self.state.players[i].hole_cards = self.deck.deal(2);
            }
        }

        self.hand_seq += 1;
        let date = Utc::now().format("%Y%m%d").to_string();
        self.hand_id = Some(format_hand_id(&date, self.hand_seq));
        self.state.phase = Phase::Preflop;
        self.state.current_player_index = self.state.next_actor_from((bb + 1) % n).unwrap_or(bb);
        self.state.recompute_turn_flags();

        // blinds alone can leave nobody able to bet
        self.resolve_forced();
        self.state.recompute_turn_flags();
        Ok(())
    }

    fn next_dealt_in(&self, start: usize) -> usize {
        let n = self.state.players.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&i| !self.state.players[i].folded)
            .unwrap_or(start % n)
    }

    fn post_blind(&mut self, index: usize, amount: u32) {
        let posted = self.state.players[index].commit(amount);
        self.state.pot += posted;
    }

    /// Validates and applies one action from `player_id`.
    pub fn apply_action(&mut self, player_id: &str, action: PlayerAction) -> Result<(), GameError> {
        if !self.state.phase.is_betting() {
            return Err(GameError::NoHandInProgress);
        }
        let index = self
            .state
            .player_index(player_id)
            .ok_or(GameError::PlayerNotInRoom)?;
        if index != self.state.current_player_index {
            return Err(GameError::NotYourTurn);
        }
        let player = &self.state.players[index];
        // unreachable while turn rotation holds; guards the index
        if !player.can_act() {
            return Err(GameError::CannotAct);
        }
        let validated = validate_action(
            player.chips,
            player.current_bet,
            self.state.current_bet,
            self.state.min_raise,
            action,
        )?;

        let id = player.id.clone();
        let amount = match validated {
            ValidatedAction::Fold => {
                self.state.players[index].folded = true;
                None
            }
            ValidatedAction::Check => None,
            ValidatedAction::Call(add) => {
                let committed = self.state.players[index].commit(add);
                self.state.pot += committed;
                Some(committed)
            }
            ValidatedAction::Raise {
                total,
                increment,
                add,
            } => {
                let committed = self.state.players[index].commit(add);
                self.state.pot += committed;
                self.state.current_bet = total;
                self.state.min_raise = increment;
                // a raise reopens the action for everyone else
                self.acted.clear();
                Some(increment)
            }
            ValidatedAction::AllIn(stack) => {
                let committed = self.state.players[index].commit(stack);
                self.state.pot += committed;
                let bet = self.state.players[index].current_bet;
                if bet > self.state.current_bet {
                    self.state.min_raise = bet - self.state.current_bet;
                    self.state.current_bet = bet;
                    self.acted.clear();
                }
                Some(committed)
            }
        };
        self.acted.insert(id.clone());
        self.record(id, action.kind(), amount);

        self.after_action();
        Ok(())
    }

    /// Marks a seat connected or not. Losing the connection during a hand
    /// folds the player so the turn order keeps moving; the seat stays.
    pub fn set_connected(&mut self, player_id: &str, connected: bool) -> Result<(), GameError> {
        let index = self
            .state
            .player_index(player_id)
            .ok_or(GameError::PlayerNotInRoom)?;
        self.state.players[index].connected = connected;

        if !connected && self.state.phase.is_betting() && !self.state.players[index].folded {
            self.state.players[index].folded = true;
            let id = self.state.players[index].id.clone();
            self.acted.insert(id.clone());
            self.record(id, ActionKind::Fold, None);
            if index == self.state.current_player_index {
                self.after_action();
            } else {
                self.resolve_forced();
            }
        }
        self.state.recompute_turn_flags();
        Ok(())
    }

    fn record(&mut self, player_id: PlayerId, action: ActionKind, amount: Option<u32>) {
        self.actions.push(ActionRecord {
            player_id: player_id.clone(),
            phase: self.state.phase,
            action,
            amount,
        });
        self.state.last_action = Some(LastAction {
            player_id,
            action,
            amount,
        });
    }

    /// Round-completion check run after every accepted action.
    fn after_action(&mut self) {
        if !self.resolve_forced() {
            self.rotate_turn();
            if self.betting_round_closed() {
                self.advance_phase();
                if self.state.phase.is_betting() {
                    self.resolve_forced();
                }
            }
        }
        self.state.recompute_turn_flags();
    }

    /// Ends the hand when one contender is left, or runs the board out when
    /// no further betting is possible. Returns whether the hand was resolved.
    fn resolve_forced(&mut self) -> bool {
        let contenders: Vec<usize> = self
            .state
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.folded)
            .map(|(i, _)| i)
            .collect();
        if contenders.len() == 1 {
            self.award_uncontested(contenders[0]);
            return true;
        }
        if !self.betting_can_continue() {
            self.run_out();
            return true;
        }
        false
    }

    /// False once every contender is all-in, or the only player with chips
    /// behind already matches the bet.
    fn betting_can_continue(&self) -> bool {
        let mut actors = self.state.players.iter().filter(|p| p.can_act());
        match (actors.next(), actors.next()) {
            (None, _) => false,
            (Some(only), None) => only.current_bet < self.state.current_bet,
            _ => true,
        }
    }

    fn rotate_turn(&mut self) {
        let n = self.state.players.len();
        if let Some(next) = self
            .state
            .next_actor_from((self.state.current_player_index + 1) % n)
        {
            self.state.current_player_index = next;
        }
    }

    fn betting_round_closed(&self) -> bool {
        let current_bet = self.state.current_bet;
        self.state
            .players
            .iter()
            .filter(|p| p.can_act())
            .all(|p| p.current_bet == current_bet && self.acted.contains(&p.id))
    }

    fn advance_phase(&mut self) {
        for p in self.state.players.iter_mut() {
            p.current_bet = 0;
        }
        self.state.current_bet = 0;
        self.state.min_raise = self.state.big_blind;
        self.acted.clear();

        let (next, new_cards) = match self.state.phase {
            Phase::Preflop => (Phase::Flop, 3),
            Phase::Flop => (Phase::Turn, 1),
            Phase::Turn => (Phase::River, 1),
            Phase::River => {
                self.showdown();
                return;
            }
            _ => return,
        };
        let cards = self.deck.deal(new_cards);
        self.state.community_cards.extend(cards);
        self.state.phase = next;

        let n = self.state.players.len();
        if let Some(first) = self.state.next_actor_from((self.state.dealer_index + 1) % n) {
            self.state.current_player_index = first;
        }
        self.state.recompute_turn_flags();
    }

    /// Deals every remaining street without betting, then shows down.
    fn run_out(&mut self) {
        while matches!(self.state.phase, Phase::Preflop | Phase::Flop | Phase::Turn) {
            self.advance_phase();
        }
        if self.state.phase == Phase::River {
            self.showdown();
        }
    }

    fn award_uncontested(&mut self, index: usize) {
        let pot = self.state.pot;
        let player = &mut self.state.players[index];
        player.add_chips(pot);
        self.state.winners = vec![Winner {
            player_id: player.id.clone(),
            amount: pot,
            hand_description: "Last player standing".to_string(),
        }];
        self.state.phase = Phase::Ended;
        self.finish_hand();
    }

    /// Every tied best hand receives `pot / winners`; the odd chips stay
    /// unawarded in `remainder`.
    fn showdown(&mut self) {
        self.state.phase = Phase::Showdown;
        let board = &self.state.community_cards;
        let mut results: Vec<_> = self
            .state
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.folded)
            .map(|(i, p)| (i, evaluate_hand(&p.hole_cards, board)))
            .collect();
        results.sort_by(|a, b| compare_hands(&b.1, &a.1));

        let Some((_, best)) = results.first().cloned() else {
            self.finish_hand();
            return;
        };
        let winners: Vec<_> = results
            .into_iter()
            .filter(|(_, r)| compare_hands(r, &best).is_eq())
            .collect();
        let count = winners.len() as u32;
        let share = self.state.pot / count;
        self.state.remainder = self.state.pot % count;
        self.state.winners = winners
            .into_iter()
            .map(|(i, result)| {
                let player = &mut self.state.players[i];
                player.add_chips(share);
                Winner {
                    player_id: player.id.clone(),
                    amount: share,
                    hand_description: result.description,
                }
            })
            .collect();
        self.finish_hand();
    }

    fn finish_hand(&mut self) {
        let record = HandRecord {
            hand_id: self.hand_id.clone().unwrap_or_default(),
            room_code: self.state.room_code.clone(),
            actions: std::mem::take(&mut self.actions),
            board: self.state.community_cards.clone(),
            winners: self.state.winners.clone(),
            pot: self.state.pot,
            remainder: self.state.remainder,
            ts: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        self.history.push_back(record);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
        self.state.recompute_turn_flags();
    }
}
