use clap::{error::ErrorKind, Parser};
use derive_more::{Display, Error};
use std::{iter::once, str::FromStr};

/// A chat participant mentioned in a command.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash)]
pub struct Mention(String);

impl From<Mention> for String {
    fn from(m: Mention) -> Self {
        m.0
    }
}

/// The reason why parsing a [`Mention`] failed.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Error)]
#[display(fmt = "expected a mention such as `@player`")]
pub struct ParseMentionError;

impl FromStr for Mention {
    type Err = ParseMentionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('@').unwrap_or(s) {
            "" => Err(ParseMentionError),
            name => Ok(Mention(name.into())),
        }
    }
}

/// What the bot can be asked to do.
#[derive(Debug, Clone, Eq, PartialEq, Parser)]
#[clap(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub enum Command {
    /// Challenges someone to a game of chess.
    #[clap(visible_aliases = &["challenge", "chalenge", "challeng", "chaleng", "fight"])]
    Play {
        /// The player with the white pieces.
        white: Mention,

        /// The player with the black pieces.
        black: Mention,
    },

    /// Lists the commands.
    #[clap(visible_aliases = &["chess", "chessbot"])]
    Help,
}

impl Command {
    /// Parses a chat message addressed to the bot.
    ///
    /// Returns `None` if the message is not addressed to the bot or names no known command.
    pub fn parse(prefix: &str, content: &str) -> Option<Result<Self, clap::Error>> {
        let mut words = content.trim().strip_prefix(prefix)?.split_whitespace();
        let name = words.next()?.to_lowercase();

        match Command::try_parse_from(once(name).chain(words.map(String::from))) {
            Err(e) if e.kind() == ErrorKind::InvalidSubcommand => None,
            result => Some(result),
        }
    }

    /// How to use the commands.
    pub fn help(prefix: &str) -> String {
        format!(
            "`{prefix}play @white @black`: challenges someone to a game of chess \
            (also `challenge` or `fight`)\n`{prefix}help`: shows this message"
        )
    }

    /// How to start a game.
    pub fn usage(prefix: &str) -> String {
        format!("Usage: `{prefix}play @white @black`")
    }
}
