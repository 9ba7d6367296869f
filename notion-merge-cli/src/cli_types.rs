//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "notion-merge")]
#[command(about = "Merge several Notion databases into a new one", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Default)]
pub(crate) struct MergeArgs {
    /// Page that will contain the merged database (prompted if omitted)
    #[arg(long)]
    pub parent: Option<String>,

    /// Title of the merged database (prompted if omitted)
    #[arg(long)]
    pub title: Option<String>,

    /// Source database IDs, in priority order (prompted if omitted)
    #[arg(long, value_delimiter = ',')]
    pub sources: Option<Vec<String>>,

    /// Add every declared select option to the target, not just the used ones
    #[arg(long)]
    pub seed_options: bool,

    /// Leave out formula, rollup and other computed values
    #[arg(long)]
    pub skip_computed: bool,

    /// Show the merged schema without creating anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Write a merge report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Merge source databases into a new database
    Merge(MergeArgs),

    /// Show a database's properties and select options
    Schema {
        /// Database ID
        database_id: String,
    },

    /// Manage the Notion token and API settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings and their sources
    Show,

    /// Interactively set up the token and API settings
    Setup,

    /// Check the token against the Notion API
    Test,

    /// Print the config file path
    Path,
}
