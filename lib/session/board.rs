use super::Players;
use crate::chess::Outcome;
use crate::transport::{Embed, Transport, View};
use std::fmt::Display;
use tracing::{error, instrument, warn};

/// How to use the keywords, displayed next to the board.
pub const HINT: &str = "`resign`: resigns the game\n`draw`: offers/accepts draw";

/// Announces the players.
pub fn intro<U: Display>(players: &Players<U>) -> String {
    format!(
        "{} will play with white pieces and {} plays with black pieces! Check out the board below:",
        players.white, players.black
    )
}

/// Asks a player to try another move.
pub fn illegal<U: Display>(player: &U) -> String {
    format!("{player} wait, that's illegal! Please, make another move.")
}

/// Tells whose move it is.
pub fn prompt<U: Display>(player: &U) -> String {
    format!("{player} to move.")
}

/// Asks for a response to a draw offer.
pub fn offer<U: Display>(offeror: &U) -> String {
    format!("{offeror} offers a draw! Type `draw` in order to accept it or anything else to decline it!")
}

/// Announces that a draw offer was declined.
pub fn declined() -> String {
    "Draw declined!".into()
}

/// Annotates the board with the last move.
pub fn last_move<U: Display>(san: &str, player: &U) -> String {
    format!("Last move: {san} by {player}")
}

/// Announces the end of the game.
pub fn outcome<U: Display>(players: &Players<U>, outcome: Outcome) -> String {
    match (outcome, outcome.winner()) {
        (Outcome::Resignation(c), Some(w)) => format!("{} resigns, {} wins.", players[c], players[w]),
        (_, Some(w)) => format!("The game is over! The winner is {}.", players[w]),
        (Outcome::Draw(d), None) => format!("The game is a draw by {d}!"),
        (_, None) => "The game was abandoned.".into(),
    }
}

/// The one message that displays the board of a game.
///
/// Every notice of the game is edited into the same message once it's been sent.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Board<H> {
    handle: Option<H>,
    template: String,
    embed: Embed,
}

impl<H: Clone + Send + Sync> Board<H> {
    /// A board that renders positions following an URL `template`, not yet sent.
    pub fn new(template: &str, key: &str) -> Self {
        Board {
            handle: None,
            template: template.into(),
            embed: Embed {
                image: template.replace("{}", key),
                footer: None,
                hint: HINT.into(),
            },
        }
    }

    /// Refers to the message that displays this board, if it has been sent.
    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    /// The attachment that displays this board.
    pub fn embed(&self) -> &Embed {
        &self.embed
    }

    /// Renders a new position.
    pub fn redraw(&mut self, key: &str) {
        self.embed.image = self.template.replace("{}", key);
    }

    /// Annotates the board.
    pub fn annotate(&mut self, footer: String) {
        self.embed.footer = Some(footer);
    }

    /// What the board looks like with a notice.
    pub fn view(&self, content: String) -> View {
        View {
            content,
            embed: Some(self.embed.clone()),
        }
    }

    /// Displays the board along with a notice.
    ///
    /// If the board can't be displayed, the notice is displayed alone.
    /// If even that fails, the failure is logged and the board remains stale.
    #[instrument(level = "debug", skip(self, transport))]
    pub async fn show<T: Transport<Handle = H>>(&mut self, transport: &mut T, content: String) {
        let view = self.view(content);

        match self.handle.clone() {
            Some(handle) => {
                if let Err(e) = transport.edit(&handle, &view).await {
                    warn!(error = %e, "failed to display the board");
                    if let Err(e) = transport.edit(&handle, &view.plain()).await {
                        error!(error = %e, "failed to display notice");
                    }
                }
            }

            None => match transport.send(&view).await {
                Ok(handle) => self.handle = Some(handle),
                Err(e) => {
                    warn!(error = %e, "failed to display the board");
                    match transport.send(&view.plain()).await {
                        Ok(handle) => self.handle = Some(handle),
                        Err(e) => error!(error = %e, "failed to display notice"),
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Color, Draw};
    use crate::transport::{MockTransport, RoomError};
    use mockall::predicate::eq;
    use test_strategy::proptest;
    use tokio::runtime;

    fn players() -> Players<String> {
        Players {
            white: "A".into(),
            black: "B".into(),
        }
    }

    #[proptest]
    fn board_renders_the_position_into_the_template(#[strategy("[a-zA-Z0-9/]+")] key: String) {
        let board = Board::<u64>::new("https://example.com/{}.png", &key);
        assert_eq!(board.embed().image, format!("https://example.com/{key}.png"));
        assert_eq!(board.embed().hint, HINT);
        assert_eq!(board.embed().footer, None);
        assert_eq!(board.handle(), None);
    }

    #[proptest]
    fn redrawing_replaces_the_image(
        #[strategy("[a-zA-Z0-9/]+")] a: String,
        #[strategy("[a-zA-Z0-9/]+")] b: String,
    ) {
        let mut board = Board::<u64>::new("{}", &a);
        board.redraw(&b);
        assert_eq!(board.embed().image, b);
    }

    #[proptest]
    fn annotation_is_displayed_in_the_footer(s: String) {
        let mut board = Board::<u64>::new("{}", "");
        board.annotate(s.clone());
        assert_eq!(board.embed().footer, Some(s));
    }

    #[proptest]
    fn board_is_sent_the_first_time_it_is_shown(s: String, h: u64) {
        let rt = runtime::Builder::new_multi_thread().build()?;
        let mut board = Board::new("{}", "");
        let view = board.view(s.clone());

        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .once()
            .with(eq(view))
            .returning(move |_| Ok(h));

        rt.block_on(board.show(&mut transport, s));
        assert_eq!(board.handle(), Some(&h));
    }

    #[proptest]
    fn board_is_edited_in_place_once_sent(s: String, t: String, h: u64) {
        let rt = runtime::Builder::new_multi_thread().build()?;
        let mut board = Board::new("{}", "");
        let view = board.view(t.clone());

        let mut transport = MockTransport::new();
        transport.expect_send().once().returning(move |_| Ok(h));
        transport
            .expect_edit()
            .once()
            .with(eq(h), eq(view))
            .returning(|_, _| Ok(()));

        rt.block_on(board.show(&mut transport, s));
        rt.block_on(board.show(&mut transport, t));
        assert_eq!(board.handle(), Some(&h));
    }

    #[proptest]
    fn notice_is_displayed_alone_if_the_board_cannot_be_sent(s: String, h: u64) {
        let rt = runtime::Builder::new_multi_thread().build()?;
        let mut board = Board::new("{}", "");

        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .once()
            .withf(|v| v.embed.is_some())
            .returning(|_| Err(RoomError::Closed));

        transport
            .expect_send()
            .once()
            .with(eq(View::text(s.clone())))
            .returning(move |_| Ok(h));

        rt.block_on(board.show(&mut transport, s));
        assert_eq!(board.handle(), Some(&h));
    }

    #[proptest]
    fn notice_is_edited_alone_if_the_board_cannot_be_edited(s: String, h: u64) {
        let rt = runtime::Builder::new_multi_thread().build()?;
        let mut board = Board::new("{}", "");

        let mut transport = MockTransport::new();
        transport.expect_send().once().returning(move |_| Ok(h));
        transport
            .expect_edit()
            .once()
            .withf(|_, v| v.embed.is_some())
            .returning(|_, _| Err(RoomError::Closed));

        transport
            .expect_edit()
            .once()
            .with(eq(h), eq(View::text(s.clone())))
            .returning(|_, _| Ok(()));

        rt.block_on(board.show(&mut transport, String::new()));
        rt.block_on(board.show(&mut transport, s));
    }

    #[proptest]
    fn failing_to_display_anything_is_not_fatal(s: String) {
        let rt = runtime::Builder::new_multi_thread().build()?;
        let mut board = Board::<u64>::new("{}", "");

        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(2)
            .returning(|_| Err(RoomError::Closed));

        rt.block_on(board.show(&mut transport, s));
        assert_eq!(board.handle(), None);
    }

    #[proptest]
    fn notices_mention_the_players() {
        let p = players();

        assert_eq!(
            intro(&p),
            "A will play with white pieces and B plays with black pieces! Check out the board below:"
        );

        assert_eq!(
            illegal(&p.white),
            "A wait, that's illegal! Please, make another move."
        );

        assert_eq!(
            offer(&p.black),
            "B offers a draw! Type `draw` in order to accept it or anything else to decline it!"
        );

        assert_eq!(last_move("e4", &p.white), "Last move: e4 by A");
    }

    #[proptest]
    fn outcome_announces_the_winner() {
        let p = players();

        assert_eq!(
            outcome(&p, Outcome::Checkmate(Color::Black)),
            "The game is over! The winner is B."
        );

        assert_eq!(
            outcome(&p, Outcome::Resignation(Color::White)),
            "A resigns, B wins."
        );

        assert_eq!(
            outcome(&p, Outcome::Draw(Draw::Agreement)),
            "The game is a draw by mutual agreement!"
        );

        assert_eq!(outcome(&p, Outcome::Abandonment), "The game was abandoned.");
    }
}
