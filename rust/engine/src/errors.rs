use thiserror::Error;

/// Rejections raised by the betting state machine. A rejected call never
/// changes table state.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GameError {
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("Hand still in progress")]
    HandInProgress,
    #[error("Player not in room")]
    PlayerNotInRoom,
    #[error("Need at least {minimum} players")]
    NotEnoughPlayers { minimum: usize },
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Cannot act")]
    CannotAct,
    #[error("Cannot check, must call or fold")]
    MustCallOrFold,
    #[error("Nothing to call, check instead")]
    NothingToCall,
    #[error("Not enough chips: need {needed}, have {available}")]
    InsufficientChips { needed: u32, available: u32 },
    #[error("Raise too small: {amount}, minimum: {minimum}")]
    RaiseTooSmall { amount: u32, minimum: u32 },
}
