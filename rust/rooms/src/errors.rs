/// Error handling for the room manager
///
/// This module provides:
/// - The `RoomError` type returned by every manager operation
/// - A flat `ErrorKind` taxonomy for transports that branch on the failure
/// - A serializable `ErrorResponse` for pushing failures to the caller
use holdem_engine::errors::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error payload handed back to the transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "room_not_found")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (structured data)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Every way a room operation can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RoomNotFound,
    GameInProgress,
    RoomFull,
    NotHost,
    NotEnoughPlayers,
    PlayerNotInRoom,
    NotYourTurn,
    CannotAct,
    MustCallOrFold,
    NothingToCall,
    InsufficientChips,
    RaiseTooSmall,
    NoHandInProgress,
    HandInProgress,
    /// Not caused by the caller
    #[serde(rename = "internal_error")]
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::RoomNotFound => "room_not_found",
            ErrorKind::GameInProgress => "game_in_progress",
            ErrorKind::RoomFull => "room_full",
            ErrorKind::NotHost => "not_host",
            ErrorKind::NotEnoughPlayers => "not_enough_players",
            ErrorKind::PlayerNotInRoom => "player_not_in_room",
            ErrorKind::NotYourTurn => "not_your_turn",
            ErrorKind::CannotAct => "cannot_act",
            ErrorKind::MustCallOrFold => "must_call_or_fold",
            ErrorKind::NothingToCall => "nothing_to_call",
            ErrorKind::InsufficientChips => "insufficient_chips",
            ErrorKind::RaiseTooSmall => "raise_too_small",
            ErrorKind::NoHandInProgress => "no_hand_in_progress",
            ErrorKind::HandInProgress => "hand_in_progress",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound(String),
    #[error("Game already in progress")]
    GameInProgress,
    #[error("Room is full")]
    RoomFull { max: usize },
    #[error("Only host can start")]
    NotHost,
    #[error("Need at least {minimum} players")]
    NotEnoughPlayers { minimum: usize },
    #[error("Player not in room")]
    PlayerNotInRoom,
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Room storage poisoned")]
    StoragePoisoned,
}

impl RoomError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoomError::RoomNotFound(_) => ErrorKind::RoomNotFound,
            RoomError::GameInProgress => ErrorKind::GameInProgress,
            RoomError::RoomFull { .. } => ErrorKind::RoomFull,
            RoomError::NotHost => ErrorKind::NotHost,
            RoomError::NotEnoughPlayers { .. } => ErrorKind::NotEnoughPlayers,
            RoomError::PlayerNotInRoom => ErrorKind::PlayerNotInRoom,
            RoomError::StoragePoisoned => ErrorKind::Internal,
            RoomError::Game(err) => match err {
                GameError::NoHandInProgress => ErrorKind::NoHandInProgress,
                GameError::HandInProgress => ErrorKind::HandInProgress,
                GameError::PlayerNotInRoom => ErrorKind::PlayerNotInRoom,
                GameError::NotEnoughPlayers { .. } => ErrorKind::NotEnoughPlayers,
                GameError::NotYourTurn => ErrorKind::NotYourTurn,
                GameError::CannotAct => ErrorKind::CannotAct,
                GameError::MustCallOrFold => ErrorKind::MustCallOrFold,
                GameError::NothingToCall => ErrorKind::NothingToCall,
                GameError::InsufficientChips { .. } => ErrorKind::InsufficientChips,
                GameError::RaiseTooSmall { .. } => ErrorKind::RaiseTooSmall,
            },
        }
    }

    /// Machine-readable code, stable across releases
    pub fn error_code(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Caller mistakes are recoverable; only poisoned storage is not.
    pub fn is_internal(&self) -> bool {
        matches!(self, RoomError::StoragePoisoned)
    }

    pub fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            RoomError::RoomNotFound(code) => Some(serde_json::json!({ "room_code": code })),
            RoomError::RoomFull { max } => Some(serde_json::json!({ "max_players": max })),
            RoomError::NotEnoughPlayers { minimum }
            | RoomError::Game(GameError::NotEnoughPlayers { minimum }) => {
                Some(serde_json::json!({ "minimum": minimum }))
            }
            RoomError::Game(GameError::InsufficientChips { needed, available }) => {
                Some(serde_json::json!({ "needed": needed, "available": available }))
            }
            RoomError::Game(GameError::RaiseTooSmall { amount, minimum }) => {
                Some(serde_json::json!({ "amount": amount, "minimum": minimum }))
            }
            _ => None,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        match self.error_details() {
            Some(details) => {
                ErrorResponse::with_details(self.error_code(), self.to_string(), details)
            }
            None => ErrorResponse::new(self.error_code(), self.to_string()),
        }
    }
}
