mod auth;
mod browser;
mod cli;
mod client;
mod commands;
mod config;
mod engine;
mod index;
mod persona;
mod schema;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

fn main() -> Result<()> {
    // Pick up .env.local / .env without overriding the real environment.
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match cli.command {
        Command::Sync(args) => commands::sync(&args),
        Command::List => commands::list(),
        Command::Open(args) => commands::open(&args),
        Command::Delete { names } => commands::delete(&names),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "rolesync", &mut io::stdout());
            Ok(())
        }
    }
}
