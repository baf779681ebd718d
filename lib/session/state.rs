use super::Offer;
use crate::chess::{Color, Outcome};
use std::ops::Index;

/// The two participants of a game.
///
/// Nothing prevents the same user from taking both seats.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Players<U> {
    /// The player who moves first.
    pub white: U,
    /// The player who moves second.
    pub black: U,
}

impl<U> Index<Color> for Players<U> {
    type Output = U;

    fn index(&self, c: Color) -> &Self::Output {
        match c {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}

impl<U: PartialEq> Players<U> {
    /// The side played by `user`, if any.
    ///
    /// If the user plays both sides, `preferred` is returned.
    pub fn seat(&self, user: &U, preferred: Color) -> Option<Color> {
        if self[preferred] == *user {
            Some(preferred)
        } else if self[!preferred] == *user {
            Some(!preferred)
        } else {
            None
        }
    }
}

/// The state of a game in progress or over.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum State {
    /// Waiting for a side to move.
    AwaitingMove(Color),
    /// Waiting for a response to a draw offer.
    AwaitingDrawResponse(Offer),
    /// The game is over.
    Terminal(Outcome),
}

impl Default for State {
    fn default() -> Self {
        State::AwaitingMove(Color::White)
    }
}

impl State {
    /// The side whose move is expected, if the game is not over.
    ///
    /// While a draw offer is pending, that is the side who held the turn when it was raised.
    pub fn turn(&self) -> Option<Color> {
        match *self {
            State::AwaitingMove(c) => Some(c),
            State::AwaitingDrawResponse(o) => Some(o.turn),
            State::Terminal(_) => None,
        }
    }

    /// The [`Outcome`] of the game, if it is over.
    pub fn outcome(&self) -> Option<Outcome> {
        match *self {
            State::Terminal(o) => Some(o),
            _ => None,
        }
    }
}
