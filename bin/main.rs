use anyhow::Error as Anyhow;
use clap::Parser;

mod cli;
mod command;
mod host;
mod io;
mod settings;

fn main() -> Result<(), Anyhow> {
    cli::Cli::parse().execute()
}
