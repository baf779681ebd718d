use super::Keyword;
use crate::chess::Color;
use derive_more::Constructor;

/// A pending draw offer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Constructor)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Offer {
    /// The side who offered the draw.
    pub offeror: Color,
    /// The side who held the turn when the offer was raised.
    pub turn: Color,
}

impl Offer {
    /// The side expected to accept or decline the offer.
    pub fn responder(&self) -> Color {
        !self.offeror
    }
}

/// How a draw offer was answered.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Response {
    Accept,
    Decline,
}

impl Response {
    /// Interprets a reply to a draw offer.
    ///
    /// Only the `draw` keyword accepts, anything else declines.
    pub fn parse(reply: &str) -> Self {
        match Keyword::parse(reply) {
            Some(Keyword::Draw) => Response::Accept,
            _ => Response::Decline,
        }
    }
}
