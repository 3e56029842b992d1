use crate::errors::GameError;
use crate::player::PlayerAction as A;

/// An action that passed validation, with the chip movement it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    /// Chips to add; capped at the stack, so a short call is an all-in
    Call(u32),
    /// Raise to `total` this round, `increment` over the current bet,
    /// costing `add` chips from the stack
    Raise {
        total: u32,
        increment: u32,
        add: u32,
    },
    /// The whole remaining stack
    AllIn(u32),
}

/// Validates a player action against the betting state of the round.
///
/// # Arguments
///
/// * `stack` - Player's remaining chips
/// * `player_bet` - What the player already committed this round
/// * `current_bet` - Highest commitment this round
/// * `min_raise` - Smallest legal raise increment
/// * `action` - The action the player wishes to perform
///
/// # Errors
///
/// - [`GameError::MustCallOrFold`] - check while chips are owed
/// - [`GameError::NothingToCall`] - call while nothing is owed
/// - [`GameError::InsufficientChips`] - raise costing more than the stack
/// - [`GameError::RaiseTooSmall`] - raise below `min_raise` that is not all-in
///
/// # Examples
///
/// ```
/// use holdem_engine::rules::{validate_action, ValidatedAction};
/// use holdem_engine::player::PlayerAction;
///
/// // Short call commits what is left
/// let result = validate_action(15, 0, 20, 20, PlayerAction::Call);
/// assert_eq!(result, Ok(ValidatedAction::Call(15)));
///
/// // Raise without amount uses the minimum raise
/// let result = validate_action(1000, 20, 20, 20, PlayerAction::Raise { amount: None });
/// assert_eq!(result, Ok(ValidatedAction::Raise { total: 40, increment: 20, add: 20 }));
/// ```
pub fn validate_action(
    stack: u32,
    player_bet: u32,
    current_bet: u32,
    min_raise: u32,
    action: A,
) -> Result<ValidatedAction, GameError> {
    let to_call = current_bet.saturating_sub(player_bet);
    match action {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Check => {
            if to_call == 0 {
                Ok(ValidatedAction::Check)
            } else {
                Err(GameError::MustCallOrFold)
            }
        }
        A::Call => {
            if to_call == 0 {
                Err(GameError::NothingToCall)
            } else {
                Ok(ValidatedAction::Call(to_call.min(stack)))
            }
        }
        A::Raise { amount } => {
            // zero behaves like no amount at all
            let increment = amount.filter(|a| *a > 0).unwrap_or(min_raise);
            let total = current_bet.saturating_add(increment);
            let add = total.saturating_sub(player_bet);
            if add > stack {
                Err(GameError::InsufficientChips {
                    needed: add,
                    available: stack,
                })
            } else if increment < min_raise && add < stack {
                Err(GameError::RaiseTooSmall {
                    amount: increment,
                    minimum: min_raise,
                })
            } else {
                Ok(ValidatedAction::Raise {
                    total,
                    increment,
                    add,
                })
            }
        }
        A::AllIn => Ok(ValidatedAction::AllIn(stack)),
    }
}
