use crate::action::{parse_sequence, Action, ActionSequence, RawStreet, Street};
use crate::cards::Card;
use crate::errors::ValidationError;

/// Statically checks parsed streets and types them.
///
/// Every rule is checked before replay because the betting engine has no
/// way to recover from malformed input.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found, in street order.
///
/// # Examples
///
/// ```
/// use handledger_engine::errors::ValidationError;
/// use handledger_engine::validation::validate_sequence;
///
/// assert!(validate_sequence("r80 c / Flop: [2s,3d,5h] / x x").is_ok());
/// assert!(matches!(
///     validate_sequence("r80 c / Flop: [2s,3d]"),
///     Err(ValidationError::WrongCardCount { expected: 3, found: 2, .. })
/// ));
/// assert!(matches!(
///     validate_sequence("b0"),
///     Err(ValidationError::NonPositiveAmount(_))
/// ));
/// ```
pub fn validate(streets: &[RawStreet]) -> Result<ActionSequence, ValidationError> {
    match streets.first() {
        None => return Err(ValidationError::Empty),
        Some(RawStreet::Board { text, .. }) => {
            return Err(ValidationError::BoardBeforePreflop(text.clone()))
        }
        Some(RawStreet::Betting(_)) => {}
    }

    let streets = streets
        .iter()
        .map(validate_street)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ActionSequence { streets })
}

pub fn validate_sequence(input: &str) -> Result<ActionSequence, ValidationError> {
    validate(&parse_sequence(input))
}

pub fn is_valid(input: &str) -> bool {
    validate_sequence(input).is_ok()
}

fn validate_street(street: &RawStreet) -> Result<Street, ValidationError> {
    match street {
        RawStreet::Betting(tokens) => tokens
            .iter()
            .map(|t| parse_action(t))
            .collect::<Result<Vec<_>, _>>()
            .map(Street::Betting),
        RawStreet::Board { kind, text, cards } => {
            let tokens = cards
                .as_ref()
                .ok_or_else(|| ValidationError::MissingCardList(text.clone()))?;
            if tokens.len() != kind.expected_cards() {
                return Err(ValidationError::WrongCardCount {
                    street: *kind,
                    expected: kind.expected_cards(),
                    found: tokens.len(),
                });
            }
            let cards = tokens
                .iter()
                .map(|t| {
                    t.parse::<Card>()
                        .map_err(|_| ValidationError::InvalidCard(t.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Street::Board { kind: *kind, cards })
        }
    }
}

pub fn parse_action(token: &str) -> Result<Action, ValidationError> {
    match token {
        "f" => Ok(Action::Fold),
        "x" | "c" => Ok(Action::CheckOrCall),
        "allin" => Ok(Action::AllIn),
        _ => {
            let amount = token
                .strip_prefix('b')
                .or_else(|| token.strip_prefix('r'))
                .ok_or_else(|| ValidationError::InvalidAction(token.to_string()))?;
            let amount: i64 = amount
                .parse()
                .map_err(|_| ValidationError::InvalidAmount(token.to_string()))?;
            if amount <= 0 {
                return Err(ValidationError::NonPositiveAmount(token.to_string()));
            }
            Ok(Action::RaiseTo(amount))
        }
    }
}
