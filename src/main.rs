use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use trimsave::cli;

#[derive(Debug, Parser)]
#[command(name = "trimsave")]
#[command(about = "Trim trailing whitespace and blank lines the way an editor does on save")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Trim files in place
    Fix {
        /// Files to trim
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Language identifier for every file (detected from the name otherwise)
        #[arg(long)]
        language: Option<String>,
        /// Only report files that would change; fail if any would
        #[arg(long)]
        check: bool,
    },
    /// Trim standard input and print the result
    Stdin {
        /// Cursor offset in chars; whitespace before it on its line is kept
        #[arg(long)]
        cursor: Option<usize>,
        /// Language identifier of the input
        #[arg(long)]
        language: Option<String>,
    },
    /// Show a summary of the event log
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.trimsave/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `trim.blank_tail false`
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Fix {
            paths,
            language,
            check,
        } => cli::run_fix(&paths, language.as_deref(), check),
        Commands::Stdin { cursor, language } => cli::run_stdin(cursor, language.as_deref()),
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
