mod app;
mod cache;
mod catalog;
mod cli;
mod db;
mod http;
mod models;
mod paths;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    app::run(cli)
}
