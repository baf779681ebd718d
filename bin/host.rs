use crate::{command::Command, io::Pipe, settings::Settings};
use anyhow::{Context, Error as Anyhow};
use clap::Args;
use lib::chess::{Color, Position};
use lib::session::{Players, Session};
use lib::transport::{Room, Seat, Transport, Update, View};
use std::io::ErrorKind;
use tokio::io::{stdin, stdout, AsyncRead, AsyncWrite};
use tokio::task::{JoinError, JoinSet};
use tokio::{select, sync::mpsc::UnboundedReceiver};
use tracing::{debug, error, info, instrument, warn};

/// Referees games of chess in a chat held over the terminal.
///
/// Every line of input is a chat message written as `author: content`.
#[derive(Debug, Default, Args)]
pub struct Host {
    /// Settings in RON format.
    #[clap(short, long, default_value = "()")]
    settings: Settings,
}

impl Host {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        self.serve(Pipe::new(stdout(), stdin())).await
    }

    /// Hosts the chat until the input is exhausted and every game has come to an end.
    pub async fn serve<W, R>(self, io: Pipe<W, R>) -> Result<(), Anyhow>
    where
        W: AsyncWrite + Send + Unpin,
        R: AsyncRead + Send + Unpin,
    {
        let (room, updates) = Room::new(self.settings.capacity);
        let bot = room.join();

        let server = Server {
            settings: self.settings,
            room,
            updates,
            bot,
            games: JoinSet::new(),
            io,
        };

        server.run().await
    }
}

struct Server<W: AsyncWrite, R: AsyncRead> {
    settings: Settings,
    room: Room,
    updates: UnboundedReceiver<Update>,
    bot: Seat,
    games: JoinSet<()>,
    io: Pipe<W, R>,
}

impl<W, R> Server<W, R>
where
    W: AsyncWrite + Send + Unpin,
    R: AsyncRead + Send + Unpin,
{
    async fn run(mut self) -> Result<(), Anyhow> {
        loop {
            select! {
                Some(update) = self.updates.recv() => self.io.send(update).await?,

                Some(game) = self.games.join_next() => reap(game),

                line = self.io.recv() => match line {
                    Ok(Some(line)) => self.receive(&line).await,
                    Ok(None) => break,
                    Err(e) if e.kind() == ErrorKind::InvalidData => {
                        warn!(error = %e, "skipping a line that is not valid UTF-8")
                    }
                    Err(e) => return Err(e).context("failed to read the chat"),
                },
            }
        }

        // Games still in progress find the room closed once they catch up with the chat.
        drop(self.room);

        info!(games = self.games.len(), "end of input");

        loop {
            select! {
                Some(update) = self.updates.recv() => self.io.send(update).await?,

                game = self.games.join_next() => match game {
                    Some(game) => reap(game),
                    None => break,
                },
            }
        }

        while let Ok(update) = self.updates.try_recv() {
            self.io.send(update).await?;
        }

        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn receive(&mut self, line: &str) {
        let (author, content) = match line.split_once(':') {
            Some((author, content)) => (author.trim(), content.trim()),
            None => {
                warn!("expected a message written as `author: content`");
                return;
            }
        };

        self.room.post(author, content);

        if let Some(cmd) = Command::parse(&self.settings.prefix, content) {
            info!(author, content, ?cmd, "command invoked");

            if let Some(reply) = self.dispatch(author, cmd) {
                if let Err(e) = self.bot.send(&View::text(reply)).await {
                    error!(error = %e, "failed to reply");
                }
            }
        }
    }

    fn dispatch(&mut self, author: &str, cmd: Result<Command, clap::Error>) -> Option<String> {
        let prefix = &self.settings.prefix;

        match cmd {
            Err(e) => {
                debug!(error = %e, "malformed command");
                Some(Command::usage(prefix))
            }

            Ok(Command::Help) => Some(Command::help(prefix)),

            Ok(Command::Play { white, black }) => {
                let players = Players {
                    white: white.into(),
                    black: black.into(),
                };

                if players.seat(&author.to_string(), Color::White).is_none() {
                    Some("You can only start a game if you are a player yourself.".into())
                } else {
                    self.challenge(players);
                    None
                }
            }
        }
    }

    fn challenge(&mut self, players: Players<String>) {
        let seat = self.room.join();
        let session = Session::new(players, Position::default(), seat, &self.settings.session);

        self.games.spawn(async move {
            match session.run().await {
                Ok(outcome) => info!(%outcome, "game over"),
                Err(e) => warn!(error = %e, "game interrupted"),
            }
        });
    }
}

fn reap(game: Result<(), JoinError>) {
    if let Err(e) = game {
        error!(error = %e, "game crashed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io, time::Duration};
    use test_strategy::proptest;
    use tokio::io::{duplex, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::{runtime, time};

    /// Feeds `input` to the host and collects its output up to the first line that contains `until`.
    async fn converse(input: &[u8], until: &str) -> io::Result<Vec<String>> {
        let (mut tx, stdin) = duplex(1 << 12);
        let (stdout, rx) = duplex(1 << 16);

        tokio::spawn(Host::default().serve(Pipe::new(stdout, stdin)));
        tx.write_all(input).await?;

        let mut lines = BufReader::new(rx).lines();
        let mut transcript = Vec::new();

        while let Some(line) = time::timeout(Duration::from_secs(10), lines.next_line()).await?? {
            let done = line.contains(until);
            transcript.push(line);
            if done {
                break;
            }
        }

        Ok(transcript)
    }

    #[proptest]
    fn challenge_starts_a_game() {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

        let transcript = rt.block_on(converse(
            b"A: !play @A @B\nA: e4\nB: e5\nA: resign\n",
            "A resigns, B wins.",
        ))?;

        let intro = "A will play with white pieces and B plays with black pieces!";
        assert!(transcript.iter().any(|l| l.contains(intro)));
        assert!(transcript.iter().any(|l| l.contains("Last move: e5 by B")));
        assert!(transcript.iter().any(|l| l.ends_with("(deleted)")));
    }

    #[proptest]
    fn only_players_may_start_a_game() {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

        let reply = "You can only start a game if you are a player yourself.";
        let transcript = rt.block_on(converse(b"C: !fight @A @B\n", reply))?;
        assert!(transcript.iter().all(|l| !l.contains("white pieces")));
    }

    #[proptest]
    fn help_lists_the_commands() {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let transcript = rt.block_on(converse(b"A: !CHESS\n", "help"))?;
        assert!(transcript.iter().any(|l| l.contains("!play @white @black")));
    }

    #[proptest]
    fn malformed_commands_are_answered_with_usage() {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let transcript = rt.block_on(converse(b"garbage\nA: !play\n", "Usage"))?;
        assert_eq!(transcript.len(), 1);
    }

    #[proptest]
    fn lines_that_are_not_valid_utf8_are_skipped() {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let transcript = rt.block_on(converse(b"\xff\xfe\nA: !help\n", "help"))?;
        assert!(transcript.iter().any(|l| l.contains("!play @white @black")));
    }

    #[proptest]
    fn host_stops_at_end_of_input() {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

        let (tx, stdin) = duplex(1);
        let (stdout, _rx) = duplex(1 << 12);
        drop(tx);

        let host = Host::default();
        let served = rt.block_on(async {
            time::timeout(Duration::from_secs(10), host.serve(Pipe::new(stdout, stdin))).await
        })?;

        assert!(served.is_ok());
    }

    #[proptest]
    fn games_play_out_the_chat_before_the_host_stops() {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

        let input = b"A: !play @A @B\nA: e4\nB: e5\nA: resign\n";
        let (mut tx, stdin) = duplex(1 << 12);
        let (stdout, mut rx) = duplex(1 << 16);
        rt.block_on(tx.write_all(input))?;
        drop(tx);

        let host = Host::default();
        let served = rt.block_on(async {
            time::timeout(Duration::from_secs(10), host.serve(Pipe::new(stdout, stdin))).await
        })?;

        assert!(served.is_ok());

        let mut transcript = String::new();
        rt.block_on(rx.read_to_string(&mut transcript))?;
        assert!(transcript.contains("A resigns, B wins."));
    }
}
