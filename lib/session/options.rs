use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

#[cfg(test)]
use proptest::prelude::*;

/// Where boards are rendered by default.
pub const DEFAULT_BOARD: &str = "http://www.fen-to-image.com/image/{}";

/// Configuration for a [`Session`][`super::Session`].
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(deny_unknown_fields, default)]
pub struct Options {
    /// The URL of the board image, where `{}` stands for the position.
    #[cfg_attr(test, strategy("[a-z:/.]*\\{\\}[a-z/.]*"))]
    pub board: String,

    /// How long to wait for the players before abandoning the game.
    ///
    /// The game waits indefinitely if unset.
    #[serde(with = "humantime_serde")]
    #[cfg_attr(test, strategy(proptest::option::of((1u64..100_000).prop_map(Duration::from_secs))))]
    pub timeout: Option<Duration>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            board: DEFAULT_BOARD.into(),
            timeout: None,
        }
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ron::ser::to_string(self).map_err(|_| fmt::Error)?)
    }
}

/// The reason why parsing [`Options`] failed.
#[derive(Debug, Display, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse session options")]
pub struct ParseOptionsError(ron::de::SpannedError);

impl FromStr for Options {
    type Err = ParseOptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}
