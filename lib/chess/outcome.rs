use super::Color;
use derive_more::Display;

/// The reason why a game of chess ended in a [draw].
///
/// [draw]: https://www.chessprogramming.org/Draw
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Draw {
    #[display(fmt = "stalemate")]
    Stalemate,

    #[display(fmt = "insufficient material")]
    InsufficientMaterial,

    #[display(fmt = "threefold repetition")]
    ThreefoldRepetition,

    #[display(fmt = "the fifty-move rule")]
    FiftyMoveRule,

    #[display(fmt = "mutual agreement")]
    Agreement,
}

/// One of the possible outcomes of a game of chess.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Outcome {
    #[display(fmt = "checkmate by the {_0} player")]
    Checkmate(Color),

    #[display(fmt = "{_0} player resigned")]
    Resignation(Color),

    #[display(fmt = "draw by {_0}")]
    Draw(Draw),

    #[display(fmt = "game abandoned")]
    Abandonment,
}

impl Outcome {
    /// The winning side, if any.
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Checkmate(c) => Some(c),
            Outcome::Resignation(c) => Some(!c),
            _ => None,
        }
    }
}
