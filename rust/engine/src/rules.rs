use crate::action::Action;
use crate::errors::EngineError;
use crate::Chips;

/// What the acting seat sees when it decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BettingView {
    pub seat: usize,
    /// Chips the seat already put in on this street.
    pub bet: Chips,
    /// Chips still behind.
    pub stack: Chips,
    /// Highest bet on this street.
    pub max_bet: Chips,
    /// Smallest legal raise increment over `max_bet`.
    pub min_increment: Chips,
    /// Whether any other live seat still has chips to answer a raise.
    pub others_can_respond: bool,
    /// False once this seat has acted and only a short all-in raised after it.
    pub may_raise: bool,
}

impl BettingView {
    pub fn to_call(&self) -> Chips {
        (self.max_bet - self.bet).clamp(0, self.stack)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    Call(Chips),
    /// `amount` is the new street bet; `full` is false for an all-in short of a full raise.
    RaiseTo { amount: Chips, full: bool },
}

/// Checks a no-limit decision against the seat's view of the street.
///
/// # Errors
///
/// - [`EngineError::NeedlessFold`] - folding while a check is available
/// - [`EngineError::NoOneToRaise`] - raising when nobody else can act
/// - [`EngineError::RaiseNotReopened`] - raising again after only a short all-in
/// - [`EngineError::InsufficientChips`] - raising past `bet + stack`
/// - [`EngineError::RaiseTooSmall`] - raising below `max_bet + min_increment`
///   with chips left behind
///
/// # Examples
///
/// ```
/// use handledger_engine::action::Action;
/// use handledger_engine::rules::{validate_action, BettingView, ValidatedAction};
///
/// let view = BettingView {
///     seat: 1,
///     bet: 20,
///     stack: 980,
///     max_bet: 40,
///     min_increment: 40,
///     others_can_respond: true,
///     may_raise: true,
/// };
/// assert_eq!(validate_action(&view, Action::CheckOrCall), Ok(ValidatedAction::Call(20)));
/// assert_eq!(
///     validate_action(&view, Action::RaiseTo(80)),
///     Ok(ValidatedAction::RaiseTo { amount: 80, full: true })
/// );
/// assert!(validate_action(&view, Action::RaiseTo(60)).is_err());
/// ```
pub fn validate_action(view: &BettingView, action: Action) -> Result<ValidatedAction, EngineError> {
    match action {
        Action::Fold => {
            if view.bet >= view.max_bet {
                Err(EngineError::NeedlessFold(view.seat))
            } else {
                Ok(ValidatedAction::Fold)
            }
        }
        Action::CheckOrCall => match view.to_call() {
            0 => Ok(ValidatedAction::Check),
            n => Ok(ValidatedAction::Call(n)),
        },
        Action::RaiseTo(amount) => validate_raise(view, amount),
        Action::AllIn => validate_raise(view, view.bet + view.stack),
    }
}

fn validate_raise(view: &BettingView, amount: Chips) -> Result<ValidatedAction, EngineError> {
    if !view.others_can_respond {
        return Err(EngineError::NoOneToRaise(view.seat));
    }
    if !view.may_raise {
        return Err(EngineError::RaiseNotReopened(view.seat));
    }
    let available = view.bet + view.stack;
    if amount > available {
        return Err(EngineError::InsufficientChips {
            seat: view.seat,
            amount,
            available,
        });
    }
    let minimum = view.max_bet.saturating_add(view.min_increment);
    let all_in = amount == available;
    if amount <= view.max_bet || (amount < minimum && !all_in) {
        return Err(EngineError::RaiseTooSmall { amount, minimum });
    }
    Ok(ValidatedAction::RaiseTo {
        amount,
        full: amount >= minimum,
    })
}
