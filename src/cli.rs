use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "episuggest",
    version,
    about = "Suggest a random unwatched episode and remember it"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one suggestion cycle (the default when no command is given)
    Suggest,
    /// List episode ids that have already been suggested
    Watched,
    /// Forget every suggestion made so far
    Reset,
}
