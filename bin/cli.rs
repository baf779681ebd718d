use crate::host::Host;
use anyhow::Error as Anyhow;
use clap::Parser;
use std::{cmp::min, io::stderr};
use tokio::runtime::{self, Runtime};
use tracing::{instrument, Level};
use tracing_subscriber::fmt::{format::FmtSpan, layer};
use tracing_subscriber::{filter::Targets, prelude::*, registry, util::SubscriberInitExt};

/// Referees chess games played over a chat read from stdin.
///
/// Chat messages are read one per line as `author: content`,
/// and whatever the referee says back is written to stdout.
/// Diagnostics go to stderr.
#[derive(Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// Verbosity of the diagnostics.
    #[clap(short, long)]
    #[cfg_attr(not(debug_assertions), clap(default_value_t = Level::INFO))]
    #[cfg_attr(debug_assertions, clap(default_value_t = Level::DEBUG))]
    verbosity: Level,

    /// How many threads play the games, defaults to one per core.
    #[clap(short, long)]
    threads: Option<usize>,

    #[clap(flatten)]
    host: Host,
}

impl Cli {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        self.trace();
        self.runtime()?.block_on(self.host.execute())
    }

    /// Reports the diagnostics of the referee at the chosen verbosity,
    /// but only warnings and errors from its dependencies.
    fn trace(&self) {
        let filter = Targets::new()
            .with_target("bot", self.verbosity)
            .with_target("lib", self.verbosity)
            .with_default(min(Level::WARN, self.verbosity));

        let writer = layer()
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(stderr);

        registry().with(filter).with(writer).init();
    }

    fn runtime(&self) -> Result<Runtime, Anyhow> {
        let mut builder = runtime::Builder::new_multi_thread();

        if let Some(n) = self.threads {
            builder.worker_threads(n.max(1));
        }

        Ok(builder.thread_name("referee").enable_all().build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn threads_are_optional() {
        let cli = Cli::try_parse_from(["bot"]).unwrap();
        assert_eq!(cli.threads, None);

        let cli = Cli::try_parse_from(["bot", "-t", "2"]).unwrap();
        assert_eq!(cli.threads, Some(2));
    }
}
