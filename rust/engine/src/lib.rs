//! # holdem-engine: Texas Hold'em Room Engine
//!
//! The synchronous core of a multiplayer Hold'em table. One [`engine::Engine`]
//! owns a room's game state, its private deck and the set of players who have
//! acted this betting round; every operation validates first and only then
//! mutates, so a rejected action leaves the table untouched.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and short notation parsing
//! - [`deck`] - Seedable 52-card deck with ChaCha20 shuffling
//! - [`hand`] - Best-of-seven hand evaluation and comparison
//! - [`player`] - Player seat state and the action sum type
//! - [`rules`] - Action legality checks
//! - [`game`] - Room data model, turn flags and redacted views
//! - [`engine`] - Betting state machine (blinds, rotation, phases, showdown)
//! - [`logger`] - Hand history records and the JSONL hand log
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use holdem_engine::cards::Card;
//! use holdem_engine::hand::{evaluate_hand, HandRank};
//!
//! let hole: Vec<Card> = ["As", "Ks"].iter().map(|c| c.parse().unwrap()).collect();
//! let board: Vec<Card> = ["Qs", "Js", "Ts", "2d", "3c"]
//!     .iter()
//!     .map(|c| c.parse().unwrap())
//!     .collect();
//!
//! let result = evaluate_hand(&hole, &board);
//! assert_eq!(result.rank, HandRank::RoyalFlush);
//! ```
//!
//! ## Deterministic Gameplay
//!
//! Seeded decks make deals reproducible:
//!
//! ```rust
//! use holdem_engine::deck::Deck;
//!
//! let mut a = Deck::new_with_seed(42);
//! let mut b = Deck::new_with_seed(42);
//! a.reset();
//! b.reset();
//! assert_eq!(a.deal(5), b.deal(5));
//! ```
//!
//! ## Action Validation
//!
//! ```rust
//! use holdem_engine::errors::GameError;
//! use holdem_engine::player::PlayerAction;
//! use holdem_engine::rules::validate_action;
//!
//! // 1000 behind, nothing committed, facing a 20 bet
//! let result = validate_action(1000, 0, 20, 20, PlayerAction::Check);
//! assert_eq!(result, Err(GameError::MustCallOrFold));
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod hand;
pub mod logger;
pub mod player;
pub mod rules;
