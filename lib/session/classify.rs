use super::{Players, State};
use crate::chess::Color;
use crate::transport::Message;
use derive_more::Display;

/// A word with special meaning to the referee.
///
/// Keywords are accepted from either player at any point of the game.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Keyword {
    #[display(fmt = "resign")]
    Resign,
    #[display(fmt = "draw")]
    Draw,
}

impl Keyword {
    /// Recognizes a keyword regardless of case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("resign") {
            Some(Keyword::Resign)
        } else if s.eq_ignore_ascii_case("draw") {
            Some(Keyword::Draw)
        } else {
            None
        }
    }
}

/// What a chat message means to a game.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Event {
    /// The side on move submitted a move.
    Move(Color),
    /// A side resigned.
    Resign(Color),
    /// A side offered a draw.
    DrawOffer(Color),
    /// The side expected to answer a draw offer did.
    DrawResponse(Color),
    /// The message has nothing to do with the game.
    Irrelevant,
}

/// Classifies a chat message in the context of the current [`State`].
pub fn classify<U: PartialEq, H>(msg: &Message<U, H>, state: &State, players: &Players<U>) -> Event {
    let keyword = Keyword::parse(&msg.content);

    match *state {
        State::Terminal(_) => Event::Irrelevant,

        State::AwaitingMove(turn) => match (players.seat(&msg.author, turn), keyword) {
            (None, _) => Event::Irrelevant,
            (Some(side), Some(Keyword::Resign)) => Event::Resign(side),
            (Some(side), Some(Keyword::Draw)) => Event::DrawOffer(side),
            (Some(side), None) if side == turn => Event::Move(turn),
            (Some(_), None) => Event::Irrelevant,
        },

        State::AwaitingDrawResponse(offer) => {
            let responder = offer.responder();
            match (players.seat(&msg.author, responder), keyword) {
                (None, _) => Event::Irrelevant,
                (Some(side), Some(Keyword::Resign)) => Event::Resign(side),
                (Some(side), _) if side == responder => Event::DrawResponse(responder),
                (Some(_), _) => Event::Irrelevant,
            }
        }
    }
}
