use super::{Color, Draw};
use derive_more::{Display, Error, From};
use shakmaty as sm;
use std::{fmt, str::FromStr};

/// A type representing a [`Position`]'s [zobrist hash].
///
/// [zobrist hash]: https://www.chessprogramming.org/Zobrist_Hashing
pub type Zobrist = u64;

/// Represents an illegal move in a given [`Position`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[display(fmt = "move `{_0}` is illegal in this position")]
pub struct IllegalMove(#[error(not(source))] pub String);

/// The current position on the chess board.
///
/// This type guarantees that it only holds valid positions.
/// It also remembers every position reached since the last irreversible move,
/// which is what claiming a draw by repetition requires.
#[derive(Display, Default, Clone)]
#[display(
    fmt = "{}",
    "sm::fen::Fen::from_position(self.0.clone(), sm::EnPassantMode::Legal)"
)]
pub struct Position(sm::Chess, Vec<Zobrist>);

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({self})")
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Position {}

fn zobrist(chess: &sm::Chess) -> Zobrist {
    let z: sm::zobrist::Zobrist64 =
        sm::zobrist::ZobristHash::zobrist_hash(chess, sm::EnPassantMode::Legal);
    z.0
}

impl Position {
    /// The side to move.
    pub fn turn(&self) -> Color {
        sm::Position::turn(&self.0).into()
    }

    /// The number of halfmoves since the last capture or pawn advance.
    ///
    /// It resets to 0 whenever a piece is captured or a pawn is moved.
    pub fn halfmoves(&self) -> u32 {
        sm::Position::halfmoves(&self.0)
    }

    /// This position's [zobrist hash].
    ///
    /// [zobrist hash]: https://www.chessprogramming.org/Zobrist_Hashing
    pub fn zobrist(&self) -> Zobrist {
        zobrist(&self.0)
    }

    /// The piece placement field of this position's [FEN].
    ///
    /// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
    pub fn placement(&self) -> String {
        let fen = self.to_string();
        fen.split(' ').next().unwrap_or_default().to_string()
    }

    /// How many times this position has occurred before.
    pub fn repetitions(&self) -> usize {
        let z = self.zobrist();
        self.1.iter().filter(|&&h| h == z).count()
    }

    /// Whether this position is a [checkmate].
    ///
    /// [checkmate]: https://www.chessprogramming.org/Checkmate
    pub fn is_checkmate(&self) -> bool {
        sm::Position::is_checkmate(&self.0)
    }

    /// Whether this position is a [stalemate].
    ///
    /// [stalemate]: https://www.chessprogramming.org/Stalemate
    pub fn is_stalemate(&self) -> bool {
        sm::Position::is_stalemate(&self.0)
    }

    /// Whether this position has [insufficient material].
    ///
    /// [insufficient material]: https://www.chessprogramming.org/Material#InsufficientMaterial
    pub fn is_material_insufficient(&self) -> bool {
        sm::Position::is_insufficient_material(&self.0)
    }

    /// Whether the side to move may claim a draw by [threefold repetition].
    ///
    /// That is the case if this position occurred for the third time,
    /// or if one of the legal moves leads to a position that did.
    ///
    /// [threefold repetition]: https://en.wikipedia.org/wiki/Threefold_repetition
    pub fn can_claim_threefold_repetition(&self) -> bool {
        if self.repetitions() >= 2 {
            return true;
        }

        let current = self.zobrist();
        sm::Position::legal_moves(&self.0)
            .iter()
            .filter(|m| !m.is_zeroing())
            .any(|m| {
                let mut next = self.0.clone();
                sm::Position::play_unchecked(&mut next, m);
                let z = zobrist(&next);
                self.1.iter().chain([&current]).filter(|&&h| h == z).count() >= 2
            })
    }

    /// Whether the side to move may claim a draw by the [fifty-move rule].
    ///
    /// That is the case if no capture or pawn advance happened in the last fifty moves,
    /// or if one of the legal moves would complete such a streak.
    ///
    /// [fifty-move rule]: https://en.wikipedia.org/wiki/Fifty-move_rule
    pub fn can_claim_fifty_moves(&self) -> bool {
        let legals = sm::Position::legal_moves(&self.0);
        match self.halfmoves() {
            h if h >= 100 => !legals.is_empty(),
            99 => legals.iter().any(|m| !m.is_zeroing()),
            _ => false,
        }
    }

    /// The reason why this position is a [`Draw`], if any.
    pub fn draw(&self) -> Option<Draw> {
        if self.is_material_insufficient() {
            Some(Draw::InsufficientMaterial)
        } else if self.can_claim_threefold_repetition() {
            Some(Draw::ThreefoldRepetition)
        } else if self.can_claim_fifty_moves() {
            Some(Draw::FiftyMoveRule)
        } else if self.is_stalemate() {
            Some(Draw::Stalemate)
        } else {
            None
        }
    }

    /// Play a move written in [standard algebraic notation] if legal in this position.
    ///
    /// The position is left untouched if the move is illegal or cannot be parsed.
    ///
    /// [standard algebraic notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation
    pub fn play(&mut self, san: &str) -> Result<(), IllegalMove> {
        let illegal = || IllegalMove(san.to_string());
        let parsed: sm::san::SanPlus = san.trim().parse().map_err(|_| illegal())?;
        let m = parsed.san.to_move(&self.0).map_err(|_| illegal())?;

        if m.is_zeroing() {
            self.1.clear();
        } else {
            let z = self.zobrist();
            self.1.push(z);
        }

        sm::Position::play_unchecked(&mut self.0, &m);
        Ok(())
    }
}

/// The reason why parsing [`Position`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParsePositionError {
    #[display(fmt = "failed to parse FEN")]
    InvalidFen,
    #[display(fmt = "illegal position")]
    IllegalPosition(IllegalPosition),
}

/// The reason why the position represented by the FEN string is illegal.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum IllegalPosition {
    #[display(fmt = "at least one side has no king")]
    MissingKing,
    #[display(fmt = "at least one side has multiple kings")]
    TooManyKings,
    #[display(fmt = "there are pawns on the back-rank")]
    PawnsOnBackRank,
    #[display(fmt = "the player in check is not to move")]
    OppositeCheck,
    #[display(fmt = "no sequence of legal moves can reach this position")]
    Other,
}

#[doc(hidden)]
impl From<sm::PositionError<sm::Chess>> for IllegalPosition {
    fn from(e: sm::PositionError<sm::Chess>) -> Self {
        let kinds = e.kinds();

        if kinds.contains(sm::PositionErrorKinds::MISSING_KING) {
            IllegalPosition::MissingKing
        } else if kinds.contains(sm::PositionErrorKinds::TOO_MANY_KINGS) {
            IllegalPosition::TooManyKings
        } else if kinds.contains(sm::PositionErrorKinds::PAWNS_ON_BACKRANK) {
            IllegalPosition::PawnsOnBackRank
        } else if kinds.contains(sm::PositionErrorKinds::OPPOSITE_CHECK) {
            IllegalPosition::OppositeCheck
        } else {
            IllegalPosition::Other
        }
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fen: sm::fen::Fen = s.parse().map_err(|_| ParsePositionError::InvalidFen)?;
        let chess: sm::Chess = fen
            .into_position(sm::CastlingMode::Standard)
            .map_err(IllegalPosition::from)?;

        Ok(Position(chess, Vec::new()))
    }
}

#[cfg(test)]
impl proptest::arbitrary::Arbitrary for Position {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        use proptest::{prelude::*, sample::Selector};

        (0..128usize, any::<Selector>())
            .prop_map(|(moves, selector)| {
                let mut pos = Position::default();
                for _ in 0..moves {
                    match selector.try_select(sm::Position::legal_moves(&pos.0)) {
                        None => break,
                        Some(m) => {
                            let san = sm::san::San::from_move(&pos.0, &m).to_string();
                            if pos.play(&san).is_err() {
                                break;
                            }
                        }
                    }
                }

                pos
            })
            .no_shrink()
            .boxed()
    }
}
