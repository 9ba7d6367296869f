//! notion-merge CLI
//!
//! Merges several Notion databases into a newly created one.

mod cli_types;
mod commands;
mod error;
mod logging;
mod prompt;
mod spinner;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;

/// Print an empty line through the logger so `--logfile` keeps it.
pub(crate) fn log_blank() {
    log::info!("");
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("{}", e);
        std::process::exit(2);
    }

    let result = match cli.command {
        Commands::Merge(args) => commands::merge::run_merge(args, cli.quiet),
        Commands::Schema { database_id } => commands::schema::run_schema(&database_id, cli.quiet),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Setup => commands::config::run_config_setup(),
            ConfigAction::Test => commands::config::run_config_test(cli.quiet),
            ConfigAction::Path => commands::config::run_config_path(),
        },
    };

    if let Err(e) = result {
        log::error!(
            "{} {}",
            "\u{2718}".if_supports_color(Stderr, |t| t.red()),
            e
        );
        std::process::exit(1);
    }
}
