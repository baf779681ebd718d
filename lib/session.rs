use crate::chess::{Color, Draw, Outcome, Rules};
use crate::transport::{Message, Transport};
use derive_more::{Display, Error, From};
use std::time::Duration;
use tokio::time;
use tracing::{debug, field::display, info, instrument, warn, Span};

mod board;
mod classify;
mod draw;
mod options;
mod state;

pub use board::{Board, HINT};
pub use classify::*;
pub use draw::*;
pub use options::*;
pub use state::*;

/// The reason why a [`Session`] was interrupted.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
#[display(fmt = "the session lost touch with the players")]
pub struct Interrupted<E>(E);

/// A game of chess between two players, refereed over chat.
///
/// The session owns the position of the game and the message that displays it.
pub struct Session<T: Transport, R> {
    players: Players<T::User>,
    rules: R,
    transport: T,
    board: Board<T::Handle>,
    state: State,
    retry: Option<Color>,
    offer: Option<T::Handle>,
    timeout: Option<Duration>,
}

impl<T, R> Session<T, R>
where
    T: Transport,
    R: Rules + Send,
{
    /// A new game with white to move.
    pub fn new(players: Players<T::User>, rules: R, transport: T, options: &Options) -> Self {
        let board = Board::new(&options.board, &rules.key());

        Session {
            players,
            rules,
            transport,
            board,
            state: State::default(),
            retry: None,
            offer: None,
            timeout: options.timeout,
        }
    }

    /// The participants of this game.
    pub fn players(&self) -> &Players<T::User> {
        &self.players
    }

    /// The current [`State`] of the game.
    pub fn state(&self) -> State {
        self.state
    }

    /// The side that must try again after attempting an illegal move, if any.
    pub fn retry(&self) -> Option<Color> {
        self.retry
    }

    /// The message that displays this game.
    pub fn board(&self) -> &Board<T::Handle> {
        &self.board
    }

    /// Introduces the players and displays the board.
    pub async fn open(&mut self) {
        let intro = board::intro(&self.players);
        self.board.show(&mut self.transport, intro).await;
    }

    /// Reacts to a chat message.
    ///
    /// Messages that have nothing to do with the game are ignored.
    #[instrument(level = "debug", skip(self, msg), fields(author = %msg.author, content = %msg.content))]
    pub async fn handle(&mut self, msg: Message<T::User, T::Handle>) {
        let event = classify(&msg, &self.state, &self.players);
        debug!(?event, turn = ?self.state.turn());

        match (self.state, event) {
            (_, Event::Irrelevant) => {}
            (_, Event::Resign(side)) => self.conclude(Outcome::Resignation(side)).await,
            (State::AwaitingMove(turn), Event::Move(side)) if side == turn => {
                self.play(turn, msg).await
            }
            (State::AwaitingMove(turn), Event::DrawOffer(side)) => {
                self.propose(Offer::new(side, turn), msg).await
            }
            (State::AwaitingDrawResponse(o), Event::DrawResponse(side)) if side == o.responder() => {
                self.respond(o, msg).await
            }
            (state, event) => warn!(?state, ?event, "ignoring unexpected event"),
        }
    }

    /// Plays the game to the end.
    #[instrument(level = "info", skip(self), err,
        fields(white = %self.players.white, black = %self.players.black, outcome))]
    pub async fn run(mut self) -> Result<Outcome, Interrupted<T::Error>> {
        self.open().await;

        loop {
            if let Some(o) = self.state.outcome() {
                Span::current().record("outcome", display(o));
                break Ok(o);
            }

            match self.next().await? {
                Some(msg) => self.handle(msg).await,
                None => {
                    info!("the players took too long");
                    self.conclude(Outcome::Abandonment).await
                }
            }
        }
    }

    async fn next(&mut self) -> Result<Option<Message<T::User, T::Handle>>, Interrupted<T::Error>> {
        let (state, players) = (&self.state, &self.players);
        let next = self
            .transport
            .wait_for(|msg| classify(msg, state, players) != Event::Irrelevant);

        match self.timeout {
            None => Ok(Some(next.await?)),
            Some(t) => match time::timeout(t, next).await {
                Ok(msg) => Ok(Some(msg?)),
                Err(_) => Ok(None),
            },
        }
    }

    async fn play(&mut self, turn: Color, msg: Message<T::User, T::Handle>) {
        let san = msg.content.trim();

        let notice = match self.rules.play(san) {
            Err(e) => {
                debug!(error = %e, "rejected move");
                self.retry = Some(turn);
                board::illegal(&self.players[turn])
            }

            Ok(()) => {
                self.retry = None;
                self.board.redraw(&self.rules.key());
                self.board
                    .annotate(board::last_move(san, &self.players[turn]));

                let outcome = match self.rules.draw() {
                    Some(d) => Some(Outcome::Draw(d)),
                    None if self.rules.is_checkmate() => Some(Outcome::Checkmate(turn)),
                    None => None,
                };

                match outcome {
                    Some(o) => {
                        self.state = State::Terminal(o);
                        board::outcome(&self.players, o)
                    }

                    None => {
                        self.state = State::AwaitingMove(!turn);
                        board::prompt(&self.players[!turn])
                    }
                }
            }
        };

        self.board.show(&mut self.transport, notice).await;
        self.discard(&msg.handle).await;
    }

    async fn propose(&mut self, offer: Offer, msg: Message<T::User, T::Handle>) {
        self.state = State::AwaitingDrawResponse(offer);
        self.offer = Some(msg.handle);
        let notice = board::offer(&self.players[offer.offeror]);
        self.board.show(&mut self.transport, notice).await;
    }

    async fn respond(&mut self, offer: Offer, msg: Message<T::User, T::Handle>) {
        match Response::parse(&msg.content) {
            Response::Accept => self.conclude(Outcome::Draw(Draw::Agreement)).await,
            Response::Decline => {
                self.state = State::AwaitingMove(offer.turn);
                self.board.show(&mut self.transport, board::declined()).await;

                if let Some(handle) = self.offer.take() {
                    self.discard(&handle).await;
                }

                self.discard(&msg.handle).await;
            }
        }
    }

    async fn conclude(&mut self, outcome: Outcome) {
        self.state = State::Terminal(outcome);
        self.offer = None;
        let notice = board::outcome(&self.players, outcome);
        self.board.show(&mut self.transport, notice).await;
    }

    async fn discard(&mut self, handle: &T::Handle) {
        if let Err(e) = self.transport.delete(handle).await {
            warn!(error = %e, ?handle, "failed to delete message");
        }
    }
}
