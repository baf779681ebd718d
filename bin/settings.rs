use derive_more::{Display, Error, From};
use lib::session::Options;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[cfg(test)]
use proptest::prelude::*;

/// Runtime configuration for the bot.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Marks chat messages addressed to the bot.
    #[cfg_attr(test, strategy("[!?$.]{1,2}"))]
    pub prefix: String,

    /// How many messages a game buffers while it's busy.
    #[cfg_attr(test, strategy(1usize..1024))]
    pub capacity: usize,

    /// How games are played.
    #[cfg_attr(test, strategy(Just(Options::default())))]
    pub session: Options,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            prefix: "!".into(),
            capacity: 64,
            session: Options::default(),
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ron::ser::to_string(self).map_err(|_| fmt::Error)?)
    }
}

/// The reason why parsing [`Settings`] failed.
#[derive(Debug, Display, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse settings")]
pub struct ParseSettingsError(ron::de::SpannedError);

impl FromStr for Settings {
    type Err = ParseSettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}
