use super::{Draw, IllegalMove, Position};

/// Trait for types that referee the moves of a game.
///
/// Implementors own the position of the game, which is only ever changed through [`Rules::play`].
#[cfg_attr(test, mockall::automock)]
pub trait Rules {
    /// Plays a move written in algebraic notation if it is legal.
    fn play(&mut self, san: &str) -> Result<(), IllegalMove>;

    /// Whether the side to move has been checkmated.
    fn is_checkmate(&self) -> bool;

    /// The reason why the game is drawn, if any.
    fn draw(&self) -> Option<Draw>;

    /// A key from which the current position can be rendered.
    fn key(&self) -> String;
}

impl Rules for Position {
    fn play(&mut self, san: &str) -> Result<(), IllegalMove> {
        Position::play(self, san)
    }

    fn is_checkmate(&self) -> bool {
        Position::is_checkmate(self)
    }

    fn draw(&self) -> Option<Draw> {
        Position::draw(self)
    }

    fn key(&self) -> String {
        self.placement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn position_is_rendered_by_its_placement(pos: Position) {
        assert_eq!(Rules::key(&pos), pos.placement());
    }

    #[proptest]
    fn position_referees_moves(mut pos: Position, s: String) {
        let mut expected = pos.clone();
        assert_eq!(Rules::play(&mut pos, &s), expected.play(&s));
        assert_eq!(pos, expected);
        assert_eq!(Rules::draw(&pos), expected.draw());
        assert_eq!(Rules::is_checkmate(&pos), expected.is_checkmate());
    }
}
